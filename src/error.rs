//! Error types for quadjoin.

use thiserror::Error;

/// Which kind of input a geometry error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Polygon,
    BoundingBox,
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryKind::Point => f.write_str("point"),
            GeometryKind::Polygon => f.write_str("polygon"),
            GeometryKind::BoundingBox => f.write_str("bounding box"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadJoinError {
    /// A single point, polygon or box failed validation. Local to that geometry.
    #[error("malformed {kind} {id}: {reason}")]
    MalformedGeometry {
        kind: GeometryKind,
        id: u64,
        reason: String,
    },

    /// Invalid join configuration. Raised before any index work begins.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("query cancelled")]
    Cancelled,

    #[error("candidate pair budget of {limit} exceeded")]
    CandidateBudgetExceeded { limit: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A structural check on a built quadtree failed.
    #[error("quadtree invariant violated: {0}")]
    CorruptIndex(String),
}

impl QuadJoinError {
    pub(crate) fn malformed(kind: GeometryKind, id: u64, reason: impl Into<String>) -> Self {
        QuadJoinError::MalformedGeometry {
            kind,
            id,
            reason: reason.into(),
        }
    }

    /// True for errors scoped to one geometry, which a batch may skip.
    pub fn is_local(&self) -> bool {
        matches!(self, QuadJoinError::MalformedGeometry { .. })
    }
}

pub type Result<T> = std::result::Result<T, QuadJoinError>;

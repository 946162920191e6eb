//! Quadtree spatial join for point-in-polygon queries.
//!
//! Points are bucketed into a quadtree, polygon bounding boxes are matched
//! against its leaves, and each candidate pair is refined with an exact
//! point-in-polygon test.
//!
//! ```rust
//! use quadjoin::{JoinConfig, RingPolygon, contains};
//!
//! let points = quadjoin::enumerate_points([(1.0, 1.0), (4.0, 4.0), (9.0, 1.0)]);
//! let polygons = vec![
//!     RingPolygon::from_exterior(
//!         0,
//!         vec![(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0), (0.0, 0.0)],
//!     ),
//! ];
//!
//! let outcome = contains(&points, &polygons, &JoinConfig::default())?.sorted();
//! let inside: Vec<u64> = outcome.results.iter().map(|c| c.point_id).collect();
//! assert_eq!(inside, vec![0, 1]);
//! # Ok::<(), quadjoin::QuadJoinError>(())
//! ```

pub mod cancel;
pub mod compute;
pub mod error;
pub mod index;
pub mod query;
pub mod stats;

pub use cancel::CancellationToken;
pub use compute::quadtree::QuadTree;
pub use error::{GeometryKind, QuadJoinError, Result};
pub use index::{PointBatch, PointIndex, UpdateReport};
pub use query::{JoinOutcome, contains, contains_with};
pub use stats::JoinStats;

pub use quadjoin_types::bbox::{BoundingBox2D, Quadrant};
pub use quadjoin_types::config::{ErrorPolicy, JoinConfig};
pub use quadjoin_types::join::{CandidatePair, Containment, sort_results};
pub use quadjoin_types::point::{TaggedPoint, enumerate_points};
pub use quadjoin_types::polygon::RingPolygon;

pub use geo::{Point, Polygon, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{
        CancellationToken, Containment, ErrorPolicy, JoinConfig, JoinOutcome, QuadJoinError,
        Result, RingPolygon, TaggedPoint, contains, contains_with,
    };

    pub use crate::{PointBatch, PointIndex};

    pub use crate::JoinStats;
}

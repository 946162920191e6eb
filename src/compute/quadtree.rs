//! Point quadtree stored as a flat arena of nodes.
//!
//! The builder splits the domain box into four equal quadrants until a cell
//! holds at most `leaf_capacity` points or `max_depth` levels exist. Points are
//! then copied into one array in depth-first Morton order so that every leaf
//! owns a single contiguous `[start, end)` range; join and refinement walk
//! those ranges instead of chasing per-point indirection.
//!
//! Nodes refer to their children by `usize` handle into the arena, so the tree
//! has no internal pointers and can be shared read-only across threads.
//!
//! # Example
//!
//! ```rust
//! use quadjoin::compute::quadtree::QuadTree;
//! use quadjoin::{JoinConfig, TaggedPoint};
//!
//! let points: Vec<TaggedPoint> = (0..100)
//!     .map(|i| TaggedPoint::new(i, (i % 10) as f64, (i / 10) as f64))
//!     .collect();
//! let config = JoinConfig::default().with_leaf_capacity(8);
//! let tree = QuadTree::from_points(points, &config)?;
//!
//! assert_eq!(tree.len(), 100);
//! assert!(tree.num_leaves() > 1);
//! tree.check_invariants()?;
//! # Ok::<(), quadjoin::QuadJoinError>(())
//! ```

use crate::compute::bbox::points_bbox;
use crate::compute::validation::{validate_config, validate_point};
use crate::error::{GeometryKind, QuadJoinError, Result};
use quadjoin_types::bbox::{BoundingBox2D, Quadrant};
use quadjoin_types::config::JoinConfig;
use quadjoin_types::point::TaggedPoint;
use std::ops::Range;

/// Handle of a node inside [`QuadTree`]'s arena.
pub type NodeId = usize;

/// The root is always the first node in the arena.
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Children in Morton order: SW, SE, NW, NE.
    Internal { children: [NodeId; 4] },
    /// Range into the reordered point array.
    Leaf { start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadNode {
    pub bbox: BoundingBox2D,
    /// Level of the node; the root is at depth 1.
    pub depth: usize,
    pub kind: NodeKind,
}

impl QuadNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Point range of a leaf, `None` for internal nodes.
    #[inline]
    pub fn range(&self) -> Option<Range<usize>> {
        match self.kind {
            NodeKind::Leaf { start, end } => Some(start..end),
            NodeKind::Internal { .. } => None,
        }
    }

    #[inline]
    pub fn children(&self) -> Option<&[NodeId; 4]> {
        match &self.kind {
            NodeKind::Internal { children } => Some(children),
            NodeKind::Leaf { .. } => None,
        }
    }
}

/// Immutable point quadtree.
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    points: Vec<TaggedPoint>,
    leaves: Vec<NodeId>,
    domain: BoundingBox2D,
    max_depth: usize,
    leaf_capacity: usize,
}

/// Intermediate owned tree produced by the (possibly parallel) recursive
/// split, flattened into the arena afterwards.
enum Draft {
    Leaf {
        bbox: BoundingBox2D,
        depth: usize,
        members: Vec<usize>,
    },
    Internal {
        bbox: BoundingBox2D,
        depth: usize,
        children: Box<[Draft; 4]>,
    },
}

#[derive(Clone, Copy)]
struct SplitParams {
    max_depth: usize,
    leaf_capacity: usize,
    parallel_threshold: usize,
}

impl QuadTree {
    /// Build a tree over `points` covering `domain`.
    ///
    /// Fails with [`QuadJoinError::Config`] for a zero depth or capacity, and
    /// with [`QuadJoinError::MalformedGeometry`] for a non-finite point, a point
    /// outside `domain` or an invalid domain box. An empty point set yields a
    /// single empty leaf.
    pub fn build(
        points: Vec<TaggedPoint>,
        domain: BoundingBox2D,
        config: &JoinConfig,
    ) -> Result<Self> {
        validate_config(config)?;

        if !domain.is_valid() {
            return Err(QuadJoinError::malformed(
                GeometryKind::BoundingBox,
                0,
                format!("invalid quadtree domain {:?}", domain),
            ));
        }

        for point in &points {
            validate_point(point)?;
            if !domain.contains_xy(point.x(), point.y()) {
                return Err(QuadJoinError::malformed(
                    GeometryKind::Point,
                    point.id,
                    format!(
                        "({}, {}) lies outside the quadtree domain",
                        point.x(),
                        point.y()
                    ),
                ));
            }
        }

        let params = SplitParams {
            max_depth: config.max_depth,
            leaf_capacity: config.leaf_capacity,
            parallel_threshold: config.parallel_threshold.max(1),
        };

        let members: Vec<usize> = (0..points.len()).collect();
        let draft = split(&points, members, domain, 1, params);

        let mut tree = QuadTree {
            nodes: Vec::new(),
            points: Vec::with_capacity(points.len()),
            leaves: Vec::new(),
            domain,
            max_depth: config.max_depth,
            leaf_capacity: config.leaf_capacity,
        };
        tree.flatten(draft, &points);

        log::debug!(
            "built quadtree: {} points, {} nodes, {} leaves, height {}",
            tree.len(),
            tree.num_nodes(),
            tree.num_leaves(),
            tree.height()
        );

        Ok(tree)
    }

    /// Build a tree whose domain is the extent of the points themselves.
    pub fn from_points(points: Vec<TaggedPoint>, config: &JoinConfig) -> Result<Self> {
        validate_config(config)?;
        let domain = points_bbox(&points)?.unwrap_or_else(|| BoundingBox2D::new(0.0, 0.0, 0.0, 0.0));
        Self::build(points, domain, config)
    }

    fn flatten(&mut self, draft: Draft, source: &[TaggedPoint]) -> NodeId {
        let id = self.nodes.len();
        match draft {
            Draft::Leaf {
                bbox,
                depth,
                members,
            } => {
                let start = self.points.len();
                self.points.extend(members.iter().map(|&i| source[i]));
                self.nodes.push(QuadNode {
                    bbox,
                    depth,
                    kind: NodeKind::Leaf {
                        start,
                        end: self.points.len(),
                    },
                });
                self.leaves.push(id);
            }
            Draft::Internal {
                bbox,
                depth,
                children,
            } => {
                self.nodes.push(QuadNode {
                    bbox,
                    depth,
                    kind: NodeKind::Internal { children: [ROOT; 4] },
                });
                let mut ids = [ROOT; 4];
                let children: [Draft; 4] = *children;
                for (slot, child) in ids.iter_mut().zip(children) {
                    *slot = self.flatten(child, source);
                }
                self.nodes[id].kind = NodeKind::Internal { children: ids };
            }
        }
        id
    }

    pub fn domain(&self) -> &BoundingBox2D {
        &self.domain
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points, grouped by leaf in Morton order.
    pub fn points(&self) -> &[TaggedPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<TaggedPoint> {
        self.points
    }

    pub fn nodes(&self) -> &[QuadNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&QuadNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> &QuadNode {
        &self.nodes[ROOT]
    }

    /// Leaf handles in Morton order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// Depth of the deepest node.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Points assigned to a leaf. Empty for internal or unknown handles.
    pub fn leaf_points(&self, id: NodeId) -> &[TaggedPoint] {
        match self.nodes.get(id).and_then(QuadNode::range) {
            Some(range) => &self.points[range],
            None => &[],
        }
    }

    /// Verify the structural invariants of the tree.
    ///
    /// - every leaf's points lie inside the leaf box
    /// - leaf ranges tile the point array in order, without gaps or overlap
    /// - every internal node's children are one level deeper, sit inside it and
    ///   together cover its box exactly
    /// - leaves above `leaf_capacity` only occur at `max_depth`
    pub fn check_invariants(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(QuadJoinError::CorruptIndex("tree has no root".into()));
        }

        let mut expected_start = 0;
        for &leaf in &self.leaves {
            let node = &self.nodes[leaf];
            let Some(range) = node.range() else {
                return Err(QuadJoinError::CorruptIndex(format!(
                    "node {} is listed as a leaf but has children",
                    leaf
                )));
            };
            if range.start != expected_start || range.end < range.start {
                return Err(QuadJoinError::CorruptIndex(format!(
                    "leaf {} range {:?} does not continue at {}",
                    leaf, range, expected_start
                )));
            }
            expected_start = range.end;

            if range.len() > self.leaf_capacity && node.depth < self.max_depth {
                return Err(QuadJoinError::CorruptIndex(format!(
                    "leaf {} holds {} points above capacity {} at depth {}",
                    leaf,
                    range.len(),
                    self.leaf_capacity,
                    node.depth
                )));
            }

            if let Some(p) = self.points[range]
                .iter()
                .find(|p| !node.bbox.contains_xy(p.x(), p.y()))
            {
                return Err(QuadJoinError::CorruptIndex(format!(
                    "point {} lies outside leaf {}",
                    p.id, leaf
                )));
            }
        }
        if expected_start != self.points.len() {
            return Err(QuadJoinError::CorruptIndex(format!(
                "leaves cover {} of {} points",
                expected_start,
                self.points.len()
            )));
        }

        for (id, node) in self.nodes.iter().enumerate() {
            let Some(children) = node.children() else {
                continue;
            };
            let mut cover: Option<BoundingBox2D> = None;
            for (quadrant, &child) in Quadrant::ALL.iter().zip(children.iter()) {
                let child_node = self.nodes.get(child).ok_or_else(|| {
                    QuadJoinError::CorruptIndex(format!("node {} has dangling child {}", id, child))
                })?;
                if child_node.depth != node.depth + 1 {
                    return Err(QuadJoinError::CorruptIndex(format!(
                        "child {} of node {} is at depth {}",
                        child, id, child_node.depth
                    )));
                }
                if child_node.bbox != node.bbox.quadrant(*quadrant) {
                    return Err(QuadJoinError::CorruptIndex(format!(
                        "child {} of node {} is not its {:?} quadrant",
                        child, id, quadrant
                    )));
                }
                cover = Some(match cover {
                    Some(c) => c.union(&child_node.bbox),
                    None => child_node.bbox,
                });
            }
            if cover != Some(node.bbox) {
                return Err(QuadJoinError::CorruptIndex(format!(
                    "children of node {} leave gaps in its box",
                    id
                )));
            }
        }

        Ok(())
    }
}

fn split(
    points: &[TaggedPoint],
    members: Vec<usize>,
    bbox: BoundingBox2D,
    depth: usize,
    params: SplitParams,
) -> Draft {
    if members.len() <= params.leaf_capacity || depth >= params.max_depth {
        return Draft::Leaf {
            bbox,
            depth,
            members,
        };
    }

    let fork = members.len() >= params.parallel_threshold;

    let mut parts: [Vec<usize>; 4] = Default::default();
    for idx in members {
        let p = &points[idx];
        parts[bbox.quadrant_of(p.x(), p.y()).index()].push(idx);
    }
    let [sw, se, nw, ne] = parts;

    let child = |quadrant: Quadrant, members: Vec<usize>| {
        split(points, members, bbox.quadrant(quadrant), depth + 1, params)
    };

    let children = if fork {
        let ((sw, se), (nw, ne)) = rayon::join(
            || {
                rayon::join(
                    || child(Quadrant::SouthWest, sw),
                    || child(Quadrant::SouthEast, se),
                )
            },
            || {
                rayon::join(
                    || child(Quadrant::NorthWest, nw),
                    || child(Quadrant::NorthEast, ne),
                )
            },
        );
        [sw, se, nw, ne]
    } else {
        [
            child(Quadrant::SouthWest, sw),
            child(Quadrant::SouthEast, se),
            child(Quadrant::NorthWest, nw),
            child(Quadrant::NorthEast, ne),
        ]
    };

    Draft::Internal {
        bbox,
        depth,
        children: Box::new(children),
    }
}

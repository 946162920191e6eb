//! Cell–polygon join: pair quadtree leaves with polygon bounding boxes.

use crate::compute::quadtree::{NodeId, NodeKind, QuadTree, ROOT};
use quadjoin_types::bbox::BoundingBox2D;
use quadjoin_types::join::CandidatePair;
use rayon::prelude::*;
use smallvec::SmallVec;

/// Below this many polygon boxes the join runs on the calling thread.
const PARALLEL_JOIN_THRESHOLD: usize = 64;

/// Non-empty leaves whose box intersects `query`, in Morton order.
///
/// Branch-and-bound descent from the root: a subtree whose box misses the
/// query box is skipped entirely, so the cost tracks the number of overlapping
/// cells rather than the number of points. Intersection uses closed intervals,
/// so a leaf that merely touches the query box is still returned.
///
/// # Examples
///
/// ```
/// use quadjoin::compute::join::candidate_leaves;
/// use quadjoin::compute::quadtree::QuadTree;
/// use quadjoin::{BoundingBox2D, JoinConfig, TaggedPoint};
///
/// let points: Vec<TaggedPoint> = (0..64)
///     .map(|i| TaggedPoint::new(i, (i % 8) as f64, (i / 8) as f64))
///     .collect();
/// let tree = QuadTree::from_points(points, &JoinConfig::default().with_leaf_capacity(4))?;
///
/// let query = BoundingBox2D::new(0.0, 0.0, 1.0, 1.0);
/// let leaves = candidate_leaves(&tree, &query);
/// assert!(!leaves.is_empty());
/// assert!(leaves.len() < tree.num_leaves());
/// # Ok::<(), quadjoin::QuadJoinError>(())
/// ```
pub fn candidate_leaves(tree: &QuadTree, query: &BoundingBox2D) -> Vec<NodeId> {
    let mut out = Vec::new();
    visit_candidates(tree, query, |leaf| out.push(leaf));
    out
}

/// Calls `emit` for each non-empty leaf intersecting `query`, in Morton order.
pub fn visit_candidates<F>(tree: &QuadTree, query: &BoundingBox2D, mut emit: F)
where
    F: FnMut(NodeId),
{
    let mut stack: SmallVec<[NodeId; 64]> = SmallVec::new();
    stack.push(ROOT);

    while let Some(id) = stack.pop() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        if !node.bbox.intersects(query) {
            continue;
        }
        match node.kind {
            NodeKind::Leaf { start, end } => {
                if end > start {
                    emit(id);
                }
            }
            NodeKind::Internal { children } => {
                // Reversed so the SW child is popped first.
                stack.extend(children.iter().rev().copied());
            }
        }
    }
}

/// Candidate pairs for one polygon box.
pub fn join_polygon(tree: &QuadTree, polygon: usize, bbox: &BoundingBox2D) -> Vec<CandidatePair> {
    let mut out = Vec::new();
    visit_candidates(tree, bbox, |leaf| out.push(CandidatePair::new(leaf, polygon)));
    out
}

/// Candidate pairs for a batch of `(polygon index, box)` entries.
///
/// Each polygon is traversed independently; large batches are spread across
/// the rayon pool. Pairs are grouped by polygon in input order.
pub fn join(tree: &QuadTree, boxes: &[(usize, BoundingBox2D)]) -> Vec<CandidatePair> {
    if boxes.len() < PARALLEL_JOIN_THRESHOLD {
        return boxes
            .iter()
            .flat_map(|(polygon, bbox)| join_polygon(tree, *polygon, bbox))
            .collect();
    }

    boxes
        .par_iter()
        .flat_map_iter(|(polygon, bbox)| join_polygon(tree, *polygon, bbox))
        .collect()
}

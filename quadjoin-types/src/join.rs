use serde::{Deserialize, Serialize};

/// A (leaf cell, polygon) pair that survived bounding-box pruning and still
/// needs exact point-in-polygon refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidatePair {
    /// Arena handle of the quadtree leaf
    pub leaf: usize,
    /// Position of the polygon in the queried slice
    pub polygon: usize,
}

impl CandidatePair {
    pub fn new(leaf: usize, polygon: usize) -> Self {
        Self { leaf, polygon }
    }
}

/// A point that lies strictly inside a polygon, identified by source ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Containment {
    pub point_id: u64,
    pub polygon_id: u64,
}

impl Containment {
    pub fn new(point_id: u64, polygon_id: u64) -> Self {
        Self {
            point_id,
            polygon_id,
        }
    }
}

/// Sort results by `(point_id, polygon_id)` and drop duplicates.
///
/// Parallel refinement emits results in no particular order; callers that
/// need reproducible output run this as a post-pass.
pub fn sort_results(results: &mut Vec<Containment>) {
    results.sort_unstable();
    results.dedup();
}

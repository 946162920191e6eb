//! Per-query counters and phase timings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What one `contains` call did and how long each phase took.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinStats {
    pub num_points: usize,
    pub num_polygons: usize,
    /// Points left out because of non-finite coordinates
    pub rejected_points: usize,
    /// Polygons left out because their geometry was malformed
    pub rejected_polygons: usize,
    pub num_nodes: usize,
    pub num_leaves: usize,
    pub tree_height: usize,
    pub num_candidates: usize,
    pub num_results: usize,
    pub build_ms: f64,
    pub join_ms: f64,
    pub refine_ms: f64,
}

impl JoinStats {
    /// Time spent in join and refine, the part of a query that runs per
    /// polygon batch.
    pub fn query_ms(&self) -> f64 {
        self.join_ms + self.refine_ms
    }

    pub fn total_ms(&self) -> f64 {
        self.build_ms + self.query_ms()
    }

    /// Fraction of all (point, polygon) combinations that matched.
    pub fn selectivity(&self) -> f64 {
        let combos = self.num_points as f64 * self.num_polygons as f64;
        if combos == 0.0 {
            0.0
        } else {
            self.num_results as f64 / combos
        }
    }

    /// Average number of candidate leaves per polygon.
    pub fn candidates_per_polygon(&self) -> f64 {
        if self.num_polygons == 0 {
            0.0
        } else {
            self.num_candidates as f64 / self.num_polygons as f64
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

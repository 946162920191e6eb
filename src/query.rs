//! The point-in-polygon join pipeline: Build → Join → Refine.
//!
//! ```rust
//! use quadjoin::{contains, JoinConfig, RingPolygon, TaggedPoint};
//!
//! let points = vec![
//!     TaggedPoint::new(0, 5.0, 5.0),
//!     TaggedPoint::new(1, 15.0, 5.0),
//! ];
//! let polygons = vec![RingPolygon::from_exterior(
//!     100,
//!     vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
//! )];
//!
//! let outcome = contains(&points, &polygons, &JoinConfig::default())?;
//! assert_eq!(outcome.results.len(), 1);
//! assert_eq!(outcome.results[0].point_id, 0);
//! assert_eq!(outcome.results[0].polygon_id, 100);
//! # Ok::<(), quadjoin::QuadJoinError>(())
//! ```

use crate::cancel::CancellationToken;
use crate::compute::bbox::{domain_bbox, points_bbox, polygon_bboxes};
use crate::compute::join::join;
use crate::compute::pip::refine;
use crate::compute::quadtree::QuadTree;
use crate::compute::validation::{validate_config, validate_point};
use crate::error::{QuadJoinError, Result};
use crate::stats::{JoinStats, millis};
use quadjoin_types::bbox::BoundingBox2D;
use quadjoin_types::config::{ErrorPolicy, JoinConfig};
use quadjoin_types::join::{Containment, sort_results};
use quadjoin_types::point::TaggedPoint;
use quadjoin_types::polygon::RingPolygon;
use std::time::Instant;

/// Result of a containment join.
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    /// Matching `(point_id, polygon_id)` pairs, in unspecified order.
    pub results: Vec<Containment>,
    pub stats: JoinStats,
    /// Geometry skipped under [`ErrorPolicy::Skip`].
    pub rejected: Vec<QuadJoinError>,
}

impl JoinOutcome {
    /// Sort results by `(point_id, polygon_id)`.
    pub fn sorted(mut self) -> Self {
        sort_results(&mut self.results);
        self
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// All `(point, polygon)` pairs where the point lies strictly inside the
/// polygon.
///
/// The configuration is checked first and a bad one fails the whole call.
/// Malformed polygons and non-finite points are handled per
/// `config.error_policy`. An empty point or polygon set gives an empty result.
pub fn contains(
    points: &[TaggedPoint],
    polygons: &[RingPolygon],
    config: &JoinConfig,
) -> Result<JoinOutcome> {
    contains_with(points, polygons, config, &CancellationToken::new())
}

/// [`contains`] with a cancellation token checked between candidate pairs.
pub fn contains_with(
    points: &[TaggedPoint],
    polygons: &[RingPolygon],
    config: &JoinConfig,
    cancel: &CancellationToken,
) -> Result<JoinOutcome> {
    validate_config(config)?;

    let mut rejected = Vec::new();
    let boxes = screen_polygons(polygons, config.error_policy, &mut rejected)?;
    let rejected_polygons = rejected.len();
    let valid_points = screen_points(points, config.error_policy, &mut rejected)?;

    let mut stats = JoinStats {
        num_points: points.len(),
        num_polygons: polygons.len(),
        rejected_points: rejected.len() - rejected_polygons,
        rejected_polygons,
        ..Default::default()
    };

    if boxes.is_empty() || valid_points.is_empty() {
        log::debug!(
            "nothing to join: {} usable points, {} usable polygons",
            valid_points.len(),
            boxes.len()
        );
        return Ok(JoinOutcome {
            results: Vec::new(),
            stats,
            rejected,
        });
    }

    let domain = domain_bbox(points_bbox(&valid_points)?, boxes.iter().map(|(_, b)| b))
        .ok_or_else(|| QuadJoinError::InvalidInput("empty join domain".into()))?;

    let build_start = Instant::now();
    let tree = QuadTree::build(valid_points, domain, config)?;
    stats.build_ms = millis(build_start.elapsed());

    let results = run_on_tree(&tree, &boxes, polygons, config, cancel, &mut stats)?;

    Ok(JoinOutcome {
        results,
        stats,
        rejected,
    })
}

/// Join and refine against an already built tree, filling in `stats`.
pub(crate) fn run_on_tree(
    tree: &QuadTree,
    boxes: &[(usize, BoundingBox2D)],
    polygons: &[RingPolygon],
    config: &JoinConfig,
    cancel: &CancellationToken,
    stats: &mut JoinStats,
) -> Result<Vec<Containment>> {
    stats.num_nodes = tree.num_nodes();
    stats.num_leaves = tree.num_leaves();
    stats.tree_height = tree.height();

    if cancel.is_cancelled() {
        return Err(QuadJoinError::Cancelled);
    }

    let join_start = Instant::now();
    let pairs = join(tree, boxes);
    stats.join_ms = millis(join_start.elapsed());
    stats.num_candidates = pairs.len();

    if let Some(limit) = config.max_candidates
        && pairs.len() > limit
    {
        log::warn!(
            "candidate budget exceeded: {} pairs for a limit of {}",
            pairs.len(),
            limit
        );
        return Err(QuadJoinError::CandidateBudgetExceeded { limit });
    }

    let refine_start = Instant::now();
    let results = refine(tree, &pairs, polygons, cancel)?;
    stats.refine_ms = millis(refine_start.elapsed());
    stats.num_results = results.len();

    log::debug!(
        "join finished: {} candidates, {} results, build {:.3} ms, join {:.3} ms, refine {:.3} ms",
        stats.num_candidates,
        stats.num_results,
        stats.build_ms,
        stats.join_ms,
        stats.refine_ms
    );

    Ok(results)
}

fn reject(policy: ErrorPolicy, err: QuadJoinError, rejected: &mut Vec<QuadJoinError>) -> Result<()> {
    match policy {
        ErrorPolicy::Skip => {
            log::warn!("skipping geometry: {}", err);
            rejected.push(err);
            Ok(())
        }
        ErrorPolicy::Abort => Err(err),
    }
}

/// Bounding boxes of the usable polygons, tagged with their input position.
pub(crate) fn screen_polygons(
    polygons: &[RingPolygon],
    policy: ErrorPolicy,
    rejected: &mut Vec<QuadJoinError>,
) -> Result<Vec<(usize, BoundingBox2D)>> {
    let mut boxes = Vec::with_capacity(polygons.len());
    for (idx, bbox) in polygon_bboxes(polygons).into_iter().enumerate() {
        match bbox {
            Ok(bbox) => boxes.push((idx, bbox)),
            Err(err) => reject(policy, err, rejected)?,
        }
    }
    Ok(boxes)
}

/// Points with finite coordinates; the rest are rejected per `policy`.
pub(crate) fn screen_points(
    points: &[TaggedPoint],
    policy: ErrorPolicy,
    rejected: &mut Vec<QuadJoinError>,
) -> Result<Vec<TaggedPoint>> {
    let mut valid = Vec::with_capacity(points.len());
    for point in points {
        match validate_point(point) {
            Ok(()) => valid.push(*point),
            Err(err) => reject(policy, err, rejected)?,
        }
    }
    Ok(valid)
}

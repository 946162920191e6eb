//! Bounding box extraction for polygons and point sets.

use crate::compute::validation::{validate_bbox, validate_point, validate_polygon};
use crate::error::{GeometryKind, QuadJoinError, Result};
use quadjoin_types::bbox::BoundingBox2D;
use quadjoin_types::point::TaggedPoint;
use quadjoin_types::polygon::RingPolygon;
use rayon::prelude::*;

/// Polygon count above which box extraction runs on the rayon pool.
const PARALLEL_EXTRACT_THRESHOLD: usize = 1024;

/// Axis-aligned bounding box of one polygon.
///
/// Holes lie inside the exterior ring, so the exterior alone determines the
/// box. The polygon is validated first; degenerate rings and non-finite
/// coordinates come back as [`QuadJoinError::MalformedGeometry`].
///
/// # Examples
///
/// ```
/// use quadjoin::compute::bbox::polygon_bbox;
/// use quadjoin::RingPolygon;
///
/// let poly = RingPolygon::from_exterior(0, vec![(1.0, 2.0), (5.0, 2.0), (3.0, 7.0)]);
/// let bbox = polygon_bbox(&poly)?;
/// assert_eq!((bbox.min_x(), bbox.min_y(), bbox.max_x(), bbox.max_y()), (1.0, 2.0, 5.0, 7.0));
/// # Ok::<(), quadjoin::QuadJoinError>(())
/// ```
pub fn polygon_bbox(polygon: &RingPolygon) -> Result<BoundingBox2D> {
    validate_polygon(polygon)?;

    let exterior = polygon.exterior().ok_or_else(|| {
        QuadJoinError::malformed(GeometryKind::Polygon, polygon.id, "polygon has no rings")
    })?;

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for coord in exterior.0.iter() {
        min_x = min_x.min(coord.x);
        min_y = min_y.min(coord.y);
        max_x = max_x.max(coord.x);
        max_y = max_y.max(coord.y);
    }

    validate_bbox(min_x, min_y, max_x, max_y).map_err(|e| match e {
        QuadJoinError::MalformedGeometry { reason, .. } => {
            QuadJoinError::malformed(GeometryKind::Polygon, polygon.id, reason)
        }
        other => other,
    })
}

/// Bounding boxes for a batch of polygons, one result per input, in order.
pub fn polygon_bboxes(polygons: &[RingPolygon]) -> Vec<Result<BoundingBox2D>> {
    if polygons.len() >= PARALLEL_EXTRACT_THRESHOLD {
        polygons.par_iter().map(polygon_bbox).collect()
    } else {
        polygons.iter().map(polygon_bbox).collect()
    }
}

/// Extent of a point set, or `None` when it is empty.
///
/// Points are expected to be validated already; a non-finite coordinate here
/// is reported rather than folded into the box.
pub fn points_bbox(points: &[TaggedPoint]) -> Result<Option<BoundingBox2D>> {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Ok(None);
    };

    validate_point(first)?;
    let mut bbox = BoundingBox2D::new(first.x(), first.y(), first.x(), first.y());
    for point in iter {
        validate_point(point)?;
        bbox.expand_to_include(point.x(), point.y());
    }
    Ok(Some(bbox))
}

/// Union of the point extent and every polygon box: the region the quadtree
/// is built over so that all candidate boxes fall inside it.
pub fn domain_bbox<'a, I>(points: Option<BoundingBox2D>, polygon_boxes: I) -> Option<BoundingBox2D>
where
    I: IntoIterator<Item = &'a BoundingBox2D>,
{
    polygon_boxes
        .into_iter()
        .fold(points, |acc, bbox| match acc {
            Some(acc) => Some(acc.union(bbox)),
            None => Some(*bbox),
        })
}

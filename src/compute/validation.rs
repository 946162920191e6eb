//! Validation for coordinates, rings, bounding boxes and join configuration.

use crate::error::{GeometryKind, QuadJoinError, Result};
use geo::LineString;
use quadjoin_types::bbox::BoundingBox2D;
use quadjoin_types::config::JoinConfig;
use quadjoin_types::point::TaggedPoint;
use quadjoin_types::polygon::{RingPolygon, open_vertex_count};

/// Validates that a point has finite coordinates.
///
/// # Examples
///
/// ```
/// use quadjoin::compute::validation::validate_point;
/// use quadjoin::TaggedPoint;
///
/// assert!(validate_point(&TaggedPoint::new(0, 1.0, 2.0)).is_ok());
/// assert!(validate_point(&TaggedPoint::new(1, f64::NAN, 2.0)).is_err());
/// ```
pub fn validate_point(point: &TaggedPoint) -> Result<()> {
    if !point.x().is_finite() {
        return Err(QuadJoinError::malformed(
            GeometryKind::Point,
            point.id,
            format!("x must be finite, got: {}", point.x()),
        ));
    }

    if !point.y().is_finite() {
        return Err(QuadJoinError::malformed(
            GeometryKind::Point,
            point.id,
            format!("y must be finite, got: {}", point.y()),
        ));
    }

    Ok(())
}

/// Validates multiple points, failing on the first bad one.
pub fn validate_points(points: &[TaggedPoint]) -> Result<()> {
    points.iter().try_for_each(validate_point)
}

/// Validates one ring of a polygon.
///
/// A ring needs at least three distinct vertices once a repeated closing
/// vertex is discounted, and every coordinate must be finite. An open ring is
/// implicitly closed and accepted.
pub fn validate_ring(polygon_id: u64, ring_idx: usize, ring: &LineString<f64>) -> Result<()> {
    let label = if ring_idx == 0 {
        "exterior ring".to_string()
    } else {
        format!("hole {}", ring_idx - 1)
    };

    for (idx, coord) in ring.0.iter().enumerate() {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(QuadJoinError::malformed(
                GeometryKind::Polygon,
                polygon_id,
                format!(
                    "{} vertex {} is not finite: ({}, {})",
                    label, idx, coord.x, coord.y
                ),
            ));
        }
    }

    let vertices = open_vertex_count(ring);
    if vertices < 3 {
        return Err(QuadJoinError::malformed(
            GeometryKind::Polygon,
            polygon_id,
            format!("{} has {} vertices, need at least 3", label, vertices),
        ));
    }

    Ok(())
}

/// Validates all rings of a polygon (exterior and holes).
///
/// # Examples
///
/// ```
/// use quadjoin::compute::validation::validate_polygon;
/// use quadjoin::RingPolygon;
///
/// let square = RingPolygon::from_exterior(
///     1,
///     vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)],
/// );
/// assert!(validate_polygon(&square).is_ok());
///
/// let sliver = RingPolygon::from_exterior(2, vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
/// assert!(validate_polygon(&sliver).is_err());
/// ```
pub fn validate_polygon(polygon: &RingPolygon) -> Result<()> {
    if polygon.rings().is_empty() {
        return Err(QuadJoinError::malformed(
            GeometryKind::Polygon,
            polygon.id,
            "polygon has no rings",
        ));
    }

    for (ring_idx, ring) in polygon.rings().iter().enumerate() {
        validate_ring(polygon.id, ring_idx, ring)?;
    }

    Ok(())
}

/// Builds a bounding box, rejecting non-finite or inverted coordinates.
///
/// `min == max` on an axis is allowed (a degenerate but valid box).
///
/// # Examples
///
/// ```
/// use quadjoin::compute::validation::validate_bbox;
///
/// assert!(validate_bbox(-10.0, -10.0, 10.0, 10.0).is_ok());
/// assert!(validate_bbox(10.0, -10.0, -10.0, 10.0).is_err()); // min > max
/// ```
pub fn validate_bbox(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<BoundingBox2D> {
    for value in [min_x, min_y, max_x, max_y] {
        if !value.is_finite() {
            return Err(QuadJoinError::malformed(
                GeometryKind::BoundingBox,
                0,
                format!("coordinate must be finite, got: {}", value),
            ));
        }
    }

    if min_x > max_x {
        return Err(QuadJoinError::malformed(
            GeometryKind::BoundingBox,
            0,
            format!("min_x ({}) must be <= max_x ({})", min_x, max_x),
        ));
    }
    if min_y > max_y {
        return Err(QuadJoinError::malformed(
            GeometryKind::BoundingBox,
            0,
            format!("min_y ({}) must be <= max_y ({})", min_y, max_y),
        ));
    }

    Ok(BoundingBox2D::new(min_x, min_y, max_x, max_y))
}

/// Checks the join configuration, mapping problems to [`QuadJoinError::Config`].
pub fn validate_config(config: &JoinConfig) -> Result<()> {
    config.validate().map_err(QuadJoinError::Config)
}

use geo::Point;
use serde::{Deserialize, Serialize};

/// A query point: planar coordinates plus the stable identifier of the record
/// it came from.
///
/// The quadtree reorders points by cell; the id is what survives that
/// reordering and ends up in each containment result.
///
/// # Examples
///
/// ```
/// use quadjoin_types::point::TaggedPoint;
///
/// let p = TaggedPoint::new(42, -74.0060, 40.7128);
/// assert_eq!(p.id, 42);
/// assert_eq!(p.x(), -74.0060);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedPoint {
    /// Opaque source identifier
    pub id: u64,
    /// The 2D point (x/y or longitude/latitude)
    pub point: Point<f64>,
}

impl TaggedPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            point: Point::new(x, y),
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.point.x()
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.point.y()
    }

    /// True when both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite()
    }
}

/// Tag each coordinate pair with its position in the input.
pub fn enumerate_points<I>(coords: I) -> Vec<TaggedPoint>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    coords
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| TaggedPoint::new(i as u64, x, y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_point_creation() {
        let p = TaggedPoint::new(3, 1.5, -2.0);
        assert_eq!(p.id, 3);
        assert_eq!(p.x(), 1.5);
        assert_eq!(p.y(), -2.0);
        assert!(p.is_finite());
    }

    #[test]
    fn test_tagged_point_non_finite() {
        assert!(!TaggedPoint::new(0, f64::NAN, 0.0).is_finite());
        assert!(!TaggedPoint::new(0, 0.0, f64::NEG_INFINITY).is_finite());
    }

    #[test]
    fn test_enumerate_points() {
        let points = enumerate_points(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let ids: Vec<u64> = points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(points[2].point, Point::new(2.0, 2.0));
    }
}

use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// A polygon stored uniformly as a list of rings.
///
/// Ring 0 is the exterior, every later ring is a hole. Rings may be given
/// explicitly closed (first == last) or open, in which case the closing edge
/// is implied. Polygons with and without holes share this one representation.
///
/// # Examples
///
/// ```
/// use quadjoin_types::polygon::RingPolygon;
///
/// let with_hole = RingPolygon::new(
///     9,
///     vec![
///         vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
///         vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)],
///     ],
/// );
/// assert_eq!(with_hole.holes().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingPolygon {
    /// Opaque source identifier
    pub id: u64,
    rings: Vec<LineString<f64>>,
}

impl RingPolygon {
    pub fn new<C>(id: u64, rings: Vec<Vec<C>>) -> Self
    where
        C: Into<Coord<f64>>,
    {
        Self {
            id,
            rings: rings.into_iter().map(LineString::from).collect(),
        }
    }

    /// A polygon without holes.
    pub fn from_exterior<C>(id: u64, exterior: Vec<C>) -> Self
    where
        C: Into<Coord<f64>>,
    {
        Self::new(id, vec![exterior])
    }

    pub fn from_rings(id: u64, rings: Vec<LineString<f64>>) -> Self {
        Self { id, rings }
    }

    /// Convert a `geo::Polygon`, keeping its exterior as ring 0.
    pub fn from_geo(id: u64, polygon: &Polygon<f64>) -> Self {
        let mut rings = Vec::with_capacity(1 + polygon.interiors().len());
        rings.push(polygon.exterior().clone());
        rings.extend(polygon.interiors().iter().cloned());
        Self { id, rings }
    }

    pub fn rings(&self) -> &[LineString<f64>] {
        &self.rings
    }

    pub fn exterior(&self) -> Option<&LineString<f64>> {
        self.rings.first()
    }

    pub fn holes(&self) -> &[LineString<f64>] {
        self.rings.get(1..).unwrap_or(&[])
    }

    /// Total number of stored vertices across all rings.
    pub fn num_vertices(&self) -> usize {
        self.rings.iter().map(|r| r.0.len()).sum()
    }
}

/// Number of distinct vertices in a ring, not counting a repeated closing
/// vertex.
pub fn open_vertex_count(ring: &LineString<f64>) -> usize {
    let coords = &ring.0;
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if coords.len() > 1 && first == last => coords.len() - 1,
        _ => coords.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_exterior_and_holes() {
        let poly = RingPolygon::new(
            1,
            vec![
                vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
                vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)],
            ],
        );
        assert_eq!(poly.rings().len(), 2);
        assert_eq!(poly.exterior().map(|r| r.0.len()), Some(5));
        assert_eq!(poly.holes().len(), 1);
        assert_eq!(poly.num_vertices(), 10);
    }

    #[test]
    fn test_empty_polygon_has_no_exterior() {
        let poly = RingPolygon::from_rings(0, Vec::new());
        assert!(poly.exterior().is_none());
        assert!(poly.holes().is_empty());
    }

    #[test]
    fn test_from_geo_polygon() {
        let geo_poly: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 4.0),
        ];
        let poly = RingPolygon::from_geo(5, &geo_poly);
        assert_eq!(poly.id, 5);
        assert_eq!(poly.rings().len(), 1);
        // geo closes rings on construction
        assert_eq!(open_vertex_count(&poly.rings()[0]), 4);
    }

    #[test]
    fn test_open_vertex_count() {
        let closed = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let open = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let single = LineString::from(vec![(0.0, 0.0)]);
        assert_eq!(open_vertex_count(&closed), 3);
        assert_eq!(open_vertex_count(&open), 3);
        assert_eq!(open_vertex_count(&single), 1);
    }
}

//! Exact point-in-polygon refinement.
//!
//! Containment uses even-odd ray casting against the exterior ring, with holes
//! subtracted. Boundary policy: a point lying exactly on any edge or vertex of
//! any ring is **outside**. The on-edge test runs before the crossing count,
//! so the answer does not depend on ring orientation, on where a ring starts,
//! or on how the quadtree happened to be configured.

use crate::cancel::CancellationToken;
use crate::compute::quadtree::QuadTree;
use crate::compute::validation::{validate_point, validate_polygon};
use crate::error::{QuadJoinError, Result};
use geo::{Coord, LineString};
use quadjoin_types::join::{CandidatePair, Containment, sort_results};
use quadjoin_types::point::TaggedPoint;
use quadjoin_types::polygon::RingPolygon;
use rayon::prelude::*;

/// Leaves larger than this are refined with one rayon task per point chunk.
const PARALLEL_LEAF_THRESHOLD: usize = 4096;

/// Where a point sits relative to a ring or polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Outside,
    Boundary,
}

/// Exact test for `(x, y)` lying on the closed segment `a`–`b`.
#[inline]
fn on_segment(x: f64, y: f64, a: Coord<f64>, b: Coord<f64>) -> bool {
    if x < a.x.min(b.x) || x > a.x.max(b.x) || y < a.y.min(b.y) || y > a.y.max(b.y) {
        return false;
    }
    let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
    cross == 0.0
}

/// Locate a point relative to a single ring. Open rings are implicitly closed.
pub fn locate_in_ring(x: f64, y: f64, ring: &LineString<f64>) -> Location {
    let coords = &ring.0;
    let Some(&last) = coords.last() else {
        return Location::Outside;
    };

    let mut inside = false;
    let mut prev = last;
    for &cur in coords {
        if on_segment(x, y, prev, cur) {
            return Location::Boundary;
        }
        // Half-open in y: an edge counts when exactly one endpoint is above.
        if (cur.y > y) != (prev.y > y) {
            let x_cross = (prev.x - cur.x) * (y - cur.y) / (prev.y - cur.y) + cur.x;
            if x < x_cross {
                inside = !inside;
            }
        }
        prev = cur;
    }

    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}

/// Locate a point relative to a polygon with holes.
pub fn locate(x: f64, y: f64, polygon: &RingPolygon) -> Location {
    let Some(exterior) = polygon.exterior() else {
        return Location::Outside;
    };

    match locate_in_ring(x, y, exterior) {
        Location::Inside => {}
        other => return other,
    }

    for hole in polygon.holes() {
        match locate_in_ring(x, y, hole) {
            Location::Outside => {}
            Location::Inside => return Location::Outside,
            Location::Boundary => return Location::Boundary,
        }
    }

    Location::Inside
}

/// True when `(x, y)` lies strictly inside `polygon`. Boundary points are
/// outside.
///
/// # Examples
///
/// ```
/// use quadjoin::compute::pip::point_in_polygon;
/// use quadjoin::RingPolygon;
///
/// let square = RingPolygon::from_exterior(
///     0,
///     vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
/// );
/// assert!(point_in_polygon(5.0, 5.0, &square));
/// assert!(!point_in_polygon(15.0, 5.0, &square));
/// assert!(!point_in_polygon(0.0, 0.0, &square));
/// assert!(!point_in_polygon(10.0, 5.0, &square));
/// ```
#[inline]
pub fn point_in_polygon(x: f64, y: f64, polygon: &RingPolygon) -> bool {
    locate(x, y, polygon) == Location::Inside
}

fn contained<'a>(
    points: &'a [TaggedPoint],
    polygon: &'a RingPolygon,
) -> impl Iterator<Item = Containment> + 'a {
    points
        .iter()
        .filter(move |p| point_in_polygon(p.x(), p.y(), polygon))
        .map(move |p| Containment::new(p.id, polygon.id))
}

/// Test every point of the pair's leaf against the pair's polygon.
///
/// A pair that refers to an unknown polygon or an internal node yields no
/// results.
pub fn refine_pair(
    tree: &QuadTree,
    pair: &CandidatePair,
    polygons: &[RingPolygon],
) -> Vec<Containment> {
    let Some(polygon) = polygons.get(pair.polygon) else {
        return Vec::new();
    };
    let points = tree.leaf_points(pair.leaf);

    if points.len() >= PARALLEL_LEAF_THRESHOLD {
        points
            .par_chunks(PARALLEL_LEAF_THRESHOLD / 4)
            .flat_map_iter(|chunk| contained(chunk, polygon))
            .collect()
    } else {
        contained(points, polygon).collect()
    }
}

/// Refine all candidate pairs in parallel.
///
/// The token is checked before each pair; once it is set, refinement stops
/// and [`QuadJoinError::Cancelled`] is returned. Result order is unspecified.
pub fn refine(
    tree: &QuadTree,
    pairs: &[CandidatePair],
    polygons: &[RingPolygon],
    cancel: &CancellationToken,
) -> Result<Vec<Containment>> {
    let per_pair: Vec<Vec<Containment>> = pairs
        .par_iter()
        .map(|pair| {
            if cancel.is_cancelled() {
                return Err(QuadJoinError::Cancelled);
            }
            Ok(refine_pair(tree, pair, polygons))
        })
        .collect::<Result<_>>()?;

    Ok(per_pair.into_iter().flatten().collect())
}

/// The naive O(|points| · |polygons|) scan using the same containment rule.
///
/// Non-finite points and malformed polygons are skipped, matching what the
/// indexed pipeline does under [`ErrorPolicy::Skip`](crate::ErrorPolicy::Skip).
/// Results are sorted by `(point_id, polygon_id)`.
pub fn brute_force_contains(points: &[TaggedPoint], polygons: &[RingPolygon]) -> Vec<Containment> {
    let valid_points: Vec<TaggedPoint> = points
        .iter()
        .filter(|p| validate_point(p).is_ok())
        .copied()
        .collect();

    let mut results: Vec<Containment> = polygons
        .par_iter()
        .filter(|poly| validate_polygon(poly).is_ok())
        .flat_map_iter(|poly| contained(&valid_points, poly).collect::<Vec<_>>())
        .collect();

    sort_results(&mut results);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;
    use quadjoin_types::config::JoinConfig;

    fn square(id: u64, min: f64, max: f64) -> RingPolygon {
        RingPolygon::from_exterior(
            id,
            vec![(min, min), (max, min), (max, max), (min, max), (min, min)],
        )
    }

    fn square_with_hole() -> RingPolygon {
        RingPolygon::new(
            1,
            vec![
                vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
                vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)],
            ],
        )
    }

    #[test]
    fn test_square_scenario() {
        let poly = square(0, 0.0, 10.0);
        assert!(point_in_polygon(5.0, 5.0, &poly));
        assert!(!point_in_polygon(15.0, 5.0, &poly));
        assert!(!point_in_polygon(0.0, 0.0, &poly));
        assert!(!point_in_polygon(10.0, 10.0, &poly));
        assert_eq!(locate(0.0, 0.0, &poly), Location::Boundary);
        assert_eq!(locate(10.0, 10.0, &poly), Location::Boundary);
    }

    #[test]
    fn test_hole_scenario() {
        let poly = square_with_hole();
        assert!(!point_in_polygon(5.0, 5.0, &poly));
        assert!(point_in_polygon(1.0, 1.0, &poly));
        assert_eq!(locate(5.0, 5.0, &poly), Location::Outside);
        // On the hole's edge counts as boundary, hence outside.
        assert_eq!(locate(4.0, 5.0, &poly), Location::Boundary);
        assert!(!point_in_polygon(6.0, 4.0, &poly));
    }

    #[test]
    fn test_every_edge_and_vertex_is_outside() {
        let poly = square(0, 0.0, 10.0);
        let boundary = [
            (0.0, 5.0),
            (10.0, 5.0),
            (5.0, 0.0),
            (5.0, 10.0),
            (0.0, 10.0),
            (10.0, 0.0),
        ];
        for (x, y) in boundary {
            assert_eq!(locate(x, y, &poly), Location::Boundary, "({}, {})", x, y);
        }
    }

    #[test]
    fn test_boundary_independent_of_orientation_and_start() {
        let ccw = vec![(0.0, 0.0), (8.0, 1.0), (6.0, 7.0), (1.0, 5.0)];
        let mut cw = ccw.clone();
        cw.reverse();
        let mut rotated = ccw.clone();
        rotated.rotate_left(2);

        let polys = [
            RingPolygon::from_exterior(0, ccw),
            RingPolygon::from_exterior(1, cw),
            RingPolygon::from_exterior(2, rotated),
        ];
        let probes = [
            (4.0, 0.5),   // on the (0,0)-(8,1) edge
            (8.0, 1.0),   // vertex
            (3.5, 6.0),   // on the (6,7)-(1,5) edge
            (4.0, 4.0),   // inside
            (7.5, 6.5),   // outside
            (0.5, 2.5),   // on the (1,5)-(0,0) edge
        ];
        for (x, y) in probes {
            let first = locate(x, y, &polys[0]);
            for poly in &polys[1..] {
                assert_eq!(locate(x, y, poly), first, "({}, {})", x, y);
            }
        }
        assert_eq!(locate(4.0, 0.5, &polys[0]), Location::Boundary);
        assert_eq!(locate(3.5, 6.0, &polys[0]), Location::Boundary);
        assert_eq!(locate(4.0, 4.0, &polys[0]), Location::Inside);
    }

    #[test]
    fn test_ray_through_vertex() {
        // The horizontal ray from (1, 2) passes exactly through the vertex (4, 2).
        let diamond = RingPolygon::from_exterior(
            0,
            vec![(2.0, 0.0), (4.0, 2.0), (2.0, 4.0), (0.0, 2.0)],
        );
        assert!(point_in_polygon(1.0, 2.0, &diamond));
        assert!(point_in_polygon(3.0, 2.0, &diamond));
        assert!(!point_in_polygon(5.0, 2.0, &diamond));
        assert!(!point_in_polygon(-1.0, 2.0, &diamond));
    }

    #[test]
    fn test_open_and_closed_rings_agree() {
        let closed = square(0, 0.0, 4.0);
        let open = RingPolygon::from_exterior(0, vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        for (x, y) in [(1.0, 1.0), (0.0, 2.0), (5.0, 1.0), (4.0, 4.0), (2.0, 3.999)] {
            assert_eq!(locate(x, y, &closed), locate(x, y, &open));
        }
    }

    #[test]
    fn test_agrees_with_geo_contains_off_boundary() {
        let geo_poly = geo::Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            vec![LineString::from(vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)])],
        );
        let poly = RingPolygon::from_geo(0, &geo_poly);
        for i in 0..40 {
            for j in 0..40 {
                let x = -1.0 + i as f64 * 0.31;
                let y = -1.0 + j as f64 * 0.29;
                if locate(x, y, &poly) == Location::Boundary {
                    continue;
                }
                let expected = geo_poly.contains(&geo::Point::new(x, y));
                assert_eq!(point_in_polygon(x, y, &poly), expected, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_refine_pair_and_cancel() {
        let points = vec![
            TaggedPoint::new(10, 5.0, 5.0),
            TaggedPoint::new(11, 15.0, 5.0),
            TaggedPoint::new(12, 0.0, 0.0),
            TaggedPoint::new(13, 10.0, 10.0),
        ];
        let config = JoinConfig::default().with_max_depth(1);
        let tree = QuadTree::from_points(points, &config).unwrap();
        let polygons = vec![square(7, 0.0, 10.0)];

        let pair = CandidatePair::new(0, 0);
        assert_eq!(
            refine_pair(&tree, &pair, &polygons),
            vec![Containment::new(10, 7)]
        );
        assert!(refine_pair(&tree, &CandidatePair::new(0, 3), &polygons).is_empty());

        let token = CancellationToken::new();
        assert_eq!(refine(&tree, &[pair], &polygons, &token).unwrap().len(), 1);
        token.cancel();
        assert_eq!(
            refine(&tree, &[pair], &polygons, &token),
            Err(QuadJoinError::Cancelled)
        );
    }

    #[test]
    fn test_large_leaf_parallel_refine() {
        let points: Vec<TaggedPoint> = (0..10_000)
            .map(|i| TaggedPoint::new(i, (i % 100) as f64 + 0.5, (i / 100) as f64 + 0.5))
            .collect();
        let config = JoinConfig::default().with_max_depth(1);
        let tree = QuadTree::from_points(points.clone(), &config).unwrap();
        let polygons = vec![square(1, 10.0, 20.0)];

        let mut results = refine_pair(&tree, &CandidatePair::new(0, 0), &polygons);
        sort_results(&mut results);
        assert_eq!(results.len(), 100);
        assert_eq!(results, brute_force_contains(&points, &polygons));
    }

    #[test]
    fn test_brute_force_skips_malformed() {
        let points = vec![TaggedPoint::new(0, 1.0, 1.0), TaggedPoint::new(1, f64::NAN, 1.0)];
        let polygons = vec![
            square(0, 0.0, 2.0),
            RingPolygon::from_exterior(1, vec![(0.0, 0.0), (2.0, 2.0)]),
        ];
        assert_eq!(
            brute_force_contains(&points, &polygons),
            vec![Containment::new(0, 0)]
        );
    }
}

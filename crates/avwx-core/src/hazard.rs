//! Route versus hazard-area intersection.
//!
//! A hazard area is the closed boundary of an AIRMET/SIGMET. A route is the
//! ordered list of great-circle legs between a flight's waypoints. The engine
//! reports which hazards have at least one boundary edge crossed by any leg.

use serde::{Deserialize, Serialize};

use crate::geometry::{great_circle_intersection, points_equal, GeoPoint};

/// Closed polygon boundary of a weather hazard.
///
/// The last vertex implicitly connects back to the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HazardArea {
    vertices: Vec<GeoPoint>,
}

/// One boundary segment of a [`HazardArea`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// One leg of a flight route between consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

impl Edge {
    /// Zero-length edges never intersect anything.
    pub fn is_degenerate(&self) -> bool {
        points_equal(&self.start, &self.end)
    }
}

impl RouteSegment {
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self { start, end }
    }

    pub fn is_degenerate(&self) -> bool {
        points_equal(&self.start, &self.end)
    }

    /// Great-circle length of the leg in meters.
    pub fn length_m(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

impl HazardArea {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Boundary edges in vertex order, ending with the closing edge.
    ///
    /// Yields exactly `n` edges for `n` vertices. A single vertex yields one
    /// degenerate self-edge; an empty area yields nothing.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let closing = match (self.vertices.last(), self.vertices.first()) {
            (Some(last), Some(first)) => Some(Edge {
                start: *last,
                end: *first,
            }),
            _ => None,
        };
        self.vertices
            .windows(2)
            .map(|pair| Edge {
                start: pair[0],
                end: pair[1],
            })
            .chain(closing)
    }
}

impl From<Vec<GeoPoint>> for HazardArea {
    fn from(vertices: Vec<GeoPoint>) -> Self {
        Self::new(vertices)
    }
}

/// Anything carrying a hazard boundary.
///
/// Lets the engine run directly over stored records without copying their
/// vertices into bare areas first.
pub trait Hazard {
    fn area(&self) -> &HazardArea;
}

impl Hazard for HazardArea {
    fn area(&self) -> &HazardArea {
        self
    }
}

impl<H: Hazard + ?Sized> Hazard for &H {
    fn area(&self) -> &HazardArea {
        (**self).area()
    }
}

/// Collect the boundary edges of a hazard area.
pub fn hazard_edges(area: &HazardArea) -> Vec<Edge> {
    area.edges().collect()
}

/// Build route legs from consecutive waypoints.
///
/// Fewer than two waypoints make an empty route.
pub fn route_segments(waypoints: &[GeoPoint]) -> Vec<RouteSegment> {
    waypoints
        .windows(2)
        .map(|pair| RouteSegment::new(pair[0], pair[1]))
        .collect()
}

/// Total great-circle length of a route in meters.
pub fn route_distance_m(route: &[RouteSegment]) -> f64 {
    route.iter().map(RouteSegment::length_m).sum()
}

/// Test one route leg against every edge of a hazard.
///
/// Degenerate legs and degenerate edges are skipped. Every remaining edge
/// contributes one entry, `None` where the leg misses it. If at least one
/// entry is a hit the whole list is returned, misses included, so callers
/// must tolerate `None` entries mixed with the hits. If nothing hits the
/// result is empty.
pub fn segment_intersects_hazard(
    seg_start: &GeoPoint,
    seg_end: &GeoPoint,
    hazard: &HazardArea,
) -> Vec<Option<GeoPoint>> {
    if points_equal(seg_start, seg_end) {
        return Vec::new();
    }

    let hits: Vec<Option<GeoPoint>> = hazard
        .edges()
        .filter(|edge| !edge.is_degenerate())
        .map(|edge| great_circle_intersection(seg_start, seg_end, &edge.start, &edge.end))
        .collect();

    if hits.iter().any(Option::is_some) {
        hits
    } else {
        Vec::new()
    }
}

/// Select the hazards crossed by any leg of the route.
///
/// Each hazard stops scanning at the first leg that crosses it. The result
/// keeps the input order of `hazards`.
pub fn intersecting_hazards<'a, H: Hazard>(hazards: &'a [H], route: &[RouteSegment]) -> Vec<&'a H> {
    hazards
        .iter()
        .filter(|hazard| {
            route.iter().any(|segment| {
                !segment_intersects_hazard(&segment.start, &segment.end, hazard.area()).is_empty()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn area(points: &[(f64, f64)]) -> HazardArea {
        HazardArea::new(points.iter().map(|&(lat, lon)| pt(lat, lon)).collect())
    }

    fn square(lat: f64, lon: f64, half: f64) -> HazardArea {
        area(&[
            (lat - half, lon - half),
            (lat - half, lon + half),
            (lat + half, lon + half),
            (lat + half, lon - half),
        ])
    }

    #[test]
    fn two_vertex_area_closes_back_to_start() {
        let edges = hazard_edges(&area(&[(0.0, 0.0), (1.0, 1.0)]));
        assert_eq!(
            edges,
            vec![
                Edge { start: pt(0.0, 0.0), end: pt(1.0, 1.0) },
                Edge { start: pt(1.0, 1.0), end: pt(0.0, 0.0) },
            ]
        );
    }

    #[test]
    fn edge_count_matches_vertex_count() {
        for n in 1..8 {
            let points: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, (i * 2) as f64)).collect();
            let hazard = area(&points);
            let edges = hazard_edges(&hazard);
            assert_eq!(edges.len(), n);
            assert!(points_equal(&edges[n - 1].end, &edges[0].start));
        }
    }

    #[test]
    fn empty_area_has_no_edges() {
        assert!(hazard_edges(&HazardArea::default()).is_empty());
    }

    #[test]
    fn single_vertex_area_is_one_degenerate_edge() {
        let hazard = area(&[(0.0, 1.0)]);
        let edges = hazard_edges(&hazard);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].is_degenerate());

        // Leg passes straight through the lone vertex.
        assert!(segment_intersects_hazard(&pt(0.0, 0.0), &pt(0.0, 2.0), &hazard).is_empty());
    }

    #[test]
    fn crossing_leg_returns_every_edge_result() {
        let hazard = area(&[(1.0, 1.0), (-1.0, 1.0)]);
        let result = segment_intersects_hazard(&pt(0.0, 0.0), &pt(0.0, 2.0), &hazard);

        // Both edges lie on the same arc, so the crossing is reported twice.
        assert_eq!(result.len(), 2);
        for hit in &result {
            let hit = hit.expect("both edges are crossed");
            assert!(hit.lat().abs() < 1e-9);
            assert!((hit.lon() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn misses_are_kept_alongside_hits() {
        // The leg enters through the west edge only; the other three edges
        // contribute `None` entries.
        let hazard = square(0.0, 5.0, 1.0);
        let result = segment_intersects_hazard(&pt(0.0, 0.0), &pt(0.0, 5.0), &hazard);
        assert_eq!(result.len(), 4);
        assert_eq!(result.iter().filter(|hit| hit.is_some()).count(), 1);
        assert!(result[3].is_some());
    }

    #[test]
    fn degenerate_edges_are_skipped() {
        let hazard = area(&[(1.0, 1.0), (1.0, 1.0), (-1.0, 1.0)]);
        let result = segment_intersects_hazard(&pt(0.0, 0.0), &pt(0.0, 2.0), &hazard);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn degenerate_leg_never_intersects() {
        let p = pt(0.0, 5.0);
        for hazard in [square(0.0, 5.0, 1.0), area(&[(1.0, 1.0), (-1.0, 1.0)]), HazardArea::default()] {
            assert!(segment_intersects_hazard(&p, &p, &hazard).is_empty());
        }
    }

    #[test]
    fn no_hits_means_empty_result() {
        let hazard = square(30.0, 30.0, 1.0);
        assert!(segment_intersects_hazard(&pt(0.0, 0.0), &pt(0.0, 2.0), &hazard).is_empty());
    }

    #[test]
    fn route_segments_pair_consecutive_waypoints() {
        let waypoints = [pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 0.0)];
        let route = route_segments(&waypoints);
        assert_eq!(
            route,
            vec![
                RouteSegment::new(pt(0.0, 0.0), pt(1.0, 1.0)),
                RouteSegment::new(pt(1.0, 1.0), pt(2.0, 0.0)),
            ]
        );
        assert!(route_segments(&waypoints[..1]).is_empty());
        assert!(route_segments(&[]).is_empty());
    }

    #[test]
    fn route_distance_sums_legs() {
        let route = route_segments(&[pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0)]);
        assert!((route_distance_m(&route) - 2.0 * 111_194.0).abs() < 200.0);
    }

    #[test]
    fn intersecting_hazards_keeps_input_order() {
        let route = route_segments(&[pt(0.0, -10.0), pt(0.0, 10.0), pt(10.0, 10.0)]);
        let hazards = vec![
            square(5.0, 10.0, 1.0),   // crossed by the second leg
            square(40.0, 40.0, 1.0),  // far away
            square(0.0, -5.0, 1.0),   // crossed by the first leg
            square(0.0, 3.0, 0.5),    // crossed by the first leg
        ];

        let hits = intersecting_hazards(&hazards, &route);
        assert_eq!(hits, vec![&hazards[0], &hazards[2], &hazards[3]]);
    }

    #[test]
    fn intersecting_hazards_empty_inputs() {
        let route = route_segments(&[pt(0.0, 0.0), pt(0.0, 2.0)]);
        let hazards = vec![area(&[(1.0, 1.0), (-1.0, 1.0)])];

        assert!(intersecting_hazards::<HazardArea>(&[], &route).is_empty());
        assert!(intersecting_hazards(&hazards, &[]).is_empty());
    }

    #[test]
    fn leg_fully_inside_a_hazard_does_not_cross_it() {
        // Only boundary crossings count.
        let hazards = vec![square(0.0, 0.0, 5.0)];
        let route = route_segments(&[pt(-1.0, -1.0), pt(1.0, 1.0)]);
        assert!(intersecting_hazards(&hazards, &route).is_empty());
    }

    #[test]
    fn intersecting_hazards_is_idempotent() {
        let route = route_segments(&[pt(0.0, -10.0), pt(0.0, 10.0)]);
        let hazards = vec![square(0.0, 0.0, 1.0), square(20.0, 0.0, 1.0), square(0.0, 9.0, 2.0)];

        let first: Vec<HazardArea> = intersecting_hazards(&hazards, &route).into_iter().cloned().collect();
        let second: Vec<HazardArea> = intersecting_hazards(&hazards, &route).into_iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![hazards[0].clone(), hazards[2].clone()]);
    }

    #[test]
    fn works_over_borrowed_hazards() {
        let owned = vec![square(0.0, 0.0, 1.0)];
        let borrowed: Vec<&HazardArea> = owned.iter().collect();
        let route = route_segments(&[pt(0.0, -5.0), pt(0.0, 5.0)]);
        assert_eq!(intersecting_hazards(&borrowed, &route).len(), 1);
    }
}

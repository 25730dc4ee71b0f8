//! Great-circle geometry on a spherical earth.
//!
//! Points are carried in decimal degrees and converted to unit vectors
//! (n-vectors) whenever paths have to be intersected. Planar line
//! intersection drifts badly near converging meridians and at high
//! latitudes, so nothing in here projects to a flat plane.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Mean earth radius used for all distance calculations.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// Tolerance on products of unit vectors. Absorbs rounding when an
/// intersection lands exactly on an arc endpoint.
const VECTOR_EPS: f64 = 1e-12;

/// A position in decimal degrees.
///
/// Equality is exact: two points are the same only if both latitude and
/// longitude match bit-for-bit as supplied. No distance tolerance applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    #[serde(rename = "latitude")]
    lat: f64,
    #[serde(rename = "longitude")]
    lon: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeometryError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeometryError> {
        check_component("latitude", lat, MAX_LATITUDE)?;
        check_component("longitude", lon, MAX_LONGITUDE)?;
        Ok(Self { lat, lon })
    }

    /// Parse a point from decimal-degree strings.
    pub fn parse(lat: &str, lon: &str) -> Result<Self, GeometryError> {
        let lat = parse_component("latitude", lat)?;
        let lon = parse_component("longitude", lon)?;
        Self::new(lat, lon)
    }

    /// Latitude in decimal degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to another point in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.lat, self.lon, other.lat, other.lon)
    }

    fn to_unit_vector(self) -> Vec3 {
        let phi = self.lat.to_radians();
        let lambda = self.lon.to_radians();
        Vec3 {
            x: phi.cos() * lambda.cos(),
            y: phi.cos() * lambda.sin(),
            z: phi.sin(),
        }
    }

    fn from_unit_vector(v: Vec3) -> Self {
        let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt()).to_degrees();
        let lon = v.y.atan2(v.x).to_degrees();
        Self { lat, lon }
    }
}

fn check_component(field: &'static str, value: f64, limit: f64) -> Result<(), GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::NotFinite { field });
    }
    if value.abs() > limit {
        return Err(GeometryError::OutOfRange { field, value, limit });
    }
    Ok(())
}

fn parse_component(field: &'static str, raw: &str) -> Result<f64, GeometryError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GeometryError::InvalidCoordinate {
            field,
            value: raw.to_string(),
        })
}

/// Exact point equality.
///
/// Used to short-circuit degenerate segments before running the
/// intersection math, which is numerically unstable for zero-length arcs.
pub fn points_equal(a: &GeoPoint, b: &GeoPoint) -> bool {
    a.lat == b.lat && a.lon == b.lon
}

/// Intersect the great-circle arc `p1 -> p2` with the arc `p3 -> p4`.
///
/// Each arc defines a great circle through its endpoints. Two distinct great
/// circles meet in exactly two antipodal points; a candidate is accepted only
/// if it lies on both finite arcs (endpoints included).
///
/// Returns `None` when:
/// - either arc has coincident or antipodal endpoints (no unique circle),
/// - the two circles are the same circle (no unique intersection),
/// - neither candidate lies within both arcs.
pub fn great_circle_intersection(
    p1: &GeoPoint,
    p2: &GeoPoint,
    p3: &GeoPoint,
    p4: &GeoPoint,
) -> Option<GeoPoint> {
    let (a1, b1) = (p1.to_unit_vector(), p2.to_unit_vector());
    let (a2, b2) = (p3.to_unit_vector(), p4.to_unit_vector());

    let n1 = a1.cross(b1).normalized()?;
    let n2 = a2.cross(b2).normalized()?;
    let candidate = n1.cross(n2).normalized()?;

    [candidate, candidate.negate()]
        .into_iter()
        .find(|p| within_arc(a1, b1, n1, *p) && within_arc(a2, b2, n2, *p))
        .map(GeoPoint::from_unit_vector)
}

/// Whether `p` (already on the circle with normal `n`) lies between `start`
/// and `end` going the short way round.
fn within_arc(start: Vec3, end: Vec3, n: Vec3, p: Vec3) -> bool {
    start.cross(p).dot(n) >= -VECTOR_EPS && p.cross(end).dot(n) >= -VECTOR_EPS
}

#[derive(Debug, Clone, Copy)]
struct Vec3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Vec3 {
    fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    fn normalized(self) -> Option<Vec3> {
        let len = self.length();
        if len < VECTOR_EPS {
            return None;
        }
        Some(Vec3 {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        })
    }

    fn negate(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn points_equal_is_reflexive() {
        let p = pt(41.97859955, -87.90480042);
        assert!(points_equal(&p, &p));
    }

    #[test]
    fn points_equal_has_no_tolerance() {
        let a = pt(10.0, 20.0);
        let b = pt(10.0, 20.000_000_000_001);
        assert!(!points_equal(&a, &b));
    }

    #[test]
    fn new_rejects_bad_coordinates() {
        assert_eq!(
            GeoPoint::new(f64::NAN, 0.0),
            Err(GeometryError::NotFinite { field: "latitude" })
        );
        assert!(matches!(
            GeoPoint::new(0.0, 181.0),
            Err(GeometryError::OutOfRange { field: "longitude", .. })
        ));
        assert!(matches!(
            GeoPoint::new(-90.5, 0.0),
            Err(GeometryError::OutOfRange { field: "latitude", .. })
        ));
    }

    #[test]
    fn parse_labels_the_bad_field() {
        let err = GeoPoint::parse("12.5", "east").unwrap_err();
        assert_eq!(
            err,
            GeometryError::InvalidCoordinate {
                field: "longitude",
                value: "east".to_string()
            }
        );
        assert!(err.to_string().contains("longitude"));

        let p = GeoPoint::parse(" 33.5 ", "-117.25").unwrap();
        assert_eq!(p, pt(33.5, -117.25));
    }

    #[test]
    fn deserialize_validates_coordinates() {
        let ok: GeoPoint = serde_json::from_str(r#"{"latitude": 1.5, "longitude": 2.5}"#).unwrap();
        assert_eq!(ok, pt(1.5, 2.5));

        let bad = serde_json::from_str::<GeoPoint>(r#"{"latitude": 95.0, "longitude": 2.5}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_with_long_field_names() {
        let json = serde_json::to_value(pt(1.0, 2.0)).unwrap();
        assert_eq!(json, serde_json::json!({"latitude": 1.0, "longitude": 2.0}));
    }

    #[test]
    fn crossing_arcs_meet_on_the_equator() {
        let hit = great_circle_intersection(&pt(0.0, 0.0), &pt(0.0, 2.0), &pt(1.0, 1.0), &pt(-1.0, 1.0))
            .expect("arcs cross");
        assert!(hit.lat().abs() < 1e-9, "lat was {}", hit.lat());
        assert!((hit.lon() - 1.0).abs() < 1e-9, "lon was {}", hit.lon());
    }

    #[test]
    fn symmetric_diagonals_cross_at_origin() {
        let hit = great_circle_intersection(
            &pt(10.0, -10.0),
            &pt(-10.0, 10.0),
            &pt(10.0, 10.0),
            &pt(-10.0, -10.0),
        )
        .expect("diagonals cross");
        assert!(hit.lat().abs() < 1e-9);
        assert!(hit.lon().abs() < 1e-9);
    }

    #[test]
    fn intersection_outside_either_arc_is_rejected() {
        // Circles cross at (0, 5), beyond the end of the first arc.
        let miss = great_circle_intersection(&pt(0.0, 0.0), &pt(0.0, 2.0), &pt(1.0, 5.0), &pt(-1.0, 5.0));
        assert!(miss.is_none());

        // Circles cross at (0, 1), but the second arc stops short of the equator.
        let miss = great_circle_intersection(&pt(0.0, 0.0), &pt(0.0, 2.0), &pt(3.0, 1.0), &pt(1.0, 1.0));
        assert!(miss.is_none());
    }

    #[test]
    fn same_great_circle_has_no_unique_intersection() {
        let overlap = great_circle_intersection(&pt(0.0, 0.0), &pt(0.0, 10.0), &pt(0.0, 5.0), &pt(0.0, 15.0));
        assert!(overlap.is_none());
    }

    #[test]
    fn zero_length_arc_has_no_intersection() {
        let p = pt(0.0, 1.0);
        assert!(great_circle_intersection(&p, &p, &pt(1.0, 1.0), &pt(-1.0, 1.0)).is_none());
    }

    #[test]
    fn shared_endpoint_counts_as_intersection() {
        let hit = great_circle_intersection(&pt(0.0, 0.0), &pt(0.0, 2.0), &pt(0.0, 2.0), &pt(2.0, 2.0))
            .expect("touching arcs intersect");
        assert!(hit.lat().abs() < 1e-9);
        assert!((hit.lon() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn great_circle_route_bulges_poleward() {
        // A 20 degree leg along the 40th parallel endpoints peaks near 40.43N at
        // the midpoint. A flat projection would keep it on 40N and miss this fence.
        let hit = great_circle_intersection(
            &pt(40.0, -100.0),
            &pt(40.0, -80.0),
            &pt(40.3, -90.0),
            &pt(40.6, -90.0),
        )
        .expect("route crosses the meridian fence");
        assert!(hit.lat() > 40.4 && hit.lat() < 40.5, "lat was {}", hit.lat());
        assert!((hit.lon() + 90.0).abs() < 1e-9);
    }

    #[test]
    fn polar_paths_meet_at_the_pole() {
        // Both legs run over the pole. In lat/lon space they are two parallel
        // horizontal lines and a planar test would report no crossing.
        let hit = great_circle_intersection(
            &pt(80.0, 0.0),
            &pt(80.0, 180.0),
            &pt(85.0, -90.0),
            &pt(85.0, 90.0),
        )
        .expect("paths meet at the pole");
        assert!(hit.lat() > 89.999, "lat was {}", hit.lat());
    }

    #[test]
    fn meridian_leg_short_of_the_pole_misses_polar_edge() {
        // Planar math would put the crossing at 85N; on the sphere the edge
        // runs over the pole, beyond the end of the leg.
        let miss = great_circle_intersection(
            &pt(70.0, 0.0),
            &pt(89.0, 0.0),
            &pt(85.0, -90.0),
            &pt(85.0, 90.0),
        );
        assert!(miss.is_none());
    }

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = pt(33.6846, -117.8265);
        assert!(p.distance_to(&p) < 0.001);
    }
}

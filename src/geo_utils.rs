//! # Geographic Utilities
//!
//! Core geographic computation utilities for GPS track processing.
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees),
//! which is the standard used by GPS receivers and mapping services. All
//! functions are total: degenerate inputs return 0.0 rather than failing.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a GPS track in meters |
//! | [`bearing_deg`] | Initial great-circle bearing between two points |
//! | [`turn_angle_deg`] | Heading change at a point, 0..180 degrees |
//! | [`cross_track_distance_m`] | Perpendicular deviation from a chord |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |

use geo::{Distance, Haversine, Point};

use crate::RoutePoint;

/// Meters per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the
/// Haversine formula.
///
/// Returns the distance in meters along the Earth's surface, accurate to
/// within 0.3% for practical GPS applications.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use track_optimizer::{geo_utils, RoutePoint};
///
/// let t = Utc::now();
/// let london = RoutePoint::new(51.5074, -0.1278, 11.0, 0.0, t);
/// let paris = RoutePoint::new(48.8566, 2.3522, 35.0, 0.0, t);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &RoutePoint, p2: &RoutePoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a polyline (GPS track) in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point tracks return 0.0.
pub fn polyline_length(points: &[RoutePoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bearing / Angle Functions
// =============================================================================

/// Initial great-circle bearing from one point to another, in degrees 0..360.
///
/// 0 is north, 90 is east. Identical points return 0.
pub fn bearing_deg(from: &RoutePoint, to: &RoutePoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Heading change at `p` when travelling `prev -> p -> next`, in degrees.
///
/// Returns the absolute difference between the incoming and outgoing
/// bearings, normalized to 0..180. A straight path yields ~0, a U-turn
/// yields ~180.
pub fn turn_angle_deg(prev: &RoutePoint, p: &RoutePoint, next: &RoutePoint) -> f64 {
    let inbound = bearing_deg(prev, p);
    let outbound = bearing_deg(p, next);

    let mut diff = (outbound - inbound).abs();
    if diff > 180.0 {
        diff = 360.0 - diff;
    }
    diff
}

// =============================================================================
// Deviation Functions
// =============================================================================

/// Perpendicular distance in meters from `p` to the chord `start`-`end`.
///
/// Works in a local equirectangular projection centered on `start`, which is
/// accurate at the sub-kilometer scales GPS decimation operates on. The
/// projection of `p` onto the chord is clamped to the chord itself, so points
/// beyond either endpoint measure distance to that endpoint.
pub fn cross_track_distance_m(p: &RoutePoint, start: &RoutePoint, end: &RoutePoint) -> f64 {
    // Longitude degrees shrink with cos(latitude); floor the factor so the
    // projection stays finite near the poles.
    let lng_scale = start.latitude.to_radians().cos().max(0.01) * METERS_PER_DEGREE;

    let ex = (end.longitude - start.longitude) * lng_scale;
    let ey = (end.latitude - start.latitude) * METERS_PER_DEGREE;
    let px = (p.longitude - start.longitude) * lng_scale;
    let py = (p.latitude - start.latitude) * METERS_PER_DEGREE;

    let chord_len_sq = ex * ex + ey * ey;
    if chord_len_sq == 0.0 {
        // Degenerate chord: distance to the coincident endpoints
        return (px * px + py * py).sqrt();
    }

    let t = ((px * ex + py * ey) / chord_len_sq).clamp(0.0, 1.0);
    let dx = px - t * ex;
    let dy = py - t * ey;
    (dx * dx + dy * dy).sqrt()
}

// =============================================================================
// Conversion Functions
// =============================================================================

/// Convert meters to approximate degrees at a given latitude.
///
/// At the equator 1 degree is about 111,320 meters; the span shrinks with
/// cos(latitude) for longitude. Suitable for tolerance and bounding-box
/// calculations where a square search area is acceptable.
#[inline]
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = METERS_PER_DEGREE * lat_rad.cos().max(0.1);
    meters / meters_per_degree
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn pt(lat: f64, lng: f64) -> RoutePoint {
        RoutePoint::new(lat, lng, 0.0, 0.0, Utc.timestamp_opt(0, 0).unwrap())
    }

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = pt(51.5074, -0.1278);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = pt(51.5074, -0.1278);
        let paris = pt(48.8566, 2.3522);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_560.0, 5000.0));
    }

    #[test]
    fn test_polyline_length_degenerate() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[pt(51.5074, -0.1278)]), 0.0);
    }

    #[test]
    fn test_polyline_length_two_points() {
        let track = vec![pt(51.5074, -0.1278), pt(51.5080, -0.1280)];
        let length = polyline_length(&track);
        assert!(length > 0.0);
        assert!(length < 100.0); // about 68m
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = pt(51.5, -0.12);
        assert!(approx_eq(bearing_deg(&origin, &pt(51.6, -0.12)), 0.0, 1.0)); // north
        assert!(approx_eq(bearing_deg(&origin, &pt(51.5, -0.02)), 90.0, 1.0)); // east
        assert!(approx_eq(bearing_deg(&origin, &pt(51.4, -0.12)), 180.0, 1.0)); // south
    }

    #[test]
    fn test_turn_angle_straight_path() {
        let a = pt(51.50, -0.12);
        let b = pt(51.51, -0.12);
        let c = pt(51.52, -0.12);
        assert!(turn_angle_deg(&a, &b, &c) < 1.0);
    }

    #[test]
    fn test_turn_angle_right_angle() {
        // North then east at 51.5N
        let a = pt(51.50, -0.12);
        let b = pt(51.51, -0.12);
        let c = pt(51.51, -0.10);
        assert!(approx_eq(turn_angle_deg(&a, &b, &c), 90.0, 2.0));
    }

    #[test]
    fn test_cross_track_distance_on_chord() {
        let start = pt(51.50, -0.12);
        let end = pt(51.50, -0.10);
        let mid = pt(51.50, -0.11);
        assert!(cross_track_distance_m(&mid, &start, &end) < 0.5);
    }

    #[test]
    fn test_cross_track_distance_offset_point() {
        // 0.001 deg of latitude is about 111m off an east-west chord
        let start = pt(51.50, -0.12);
        let end = pt(51.50, -0.10);
        let off = pt(51.501, -0.11);
        let dev = cross_track_distance_m(&off, &start, &end);
        assert!(approx_eq(dev, 111.3, 3.0));
    }

    #[test]
    fn test_cross_track_distance_degenerate_chord() {
        let p = pt(51.501, -0.12);
        let anchor = pt(51.50, -0.12);
        let dev = cross_track_distance_m(&p, &anchor, &anchor);
        assert!(approx_eq(dev, 111.3, 3.0));
    }

    #[test]
    fn test_meters_to_degrees() {
        // At the equator, 111km = 1 degree
        let deg = meters_to_degrees(111_320.0, 0.0);
        assert!(approx_eq(deg, 1.0, 0.01));

        // At higher latitude, same distance = more degrees
        let deg_45 = meters_to_degrees(111_320.0, 45.0);
        assert!(deg_45 > 1.0);
    }
}

//! Speed-adaptive point decimation.
//!
//! This module provides the streaming track simplifier: a single-pass,
//! greedy variant of line simplification related to Douglas-Peucker, but
//! online rather than recursive. A recursive two-pass algorithm needs the
//! whole track up front; during live tracking points arrive one at a time,
//! so the decision for each point is made from its already-retained
//! predecessor and its immediate successor only.
//!
//! The aggressiveness of the decimation is controlled entirely by an
//! [`OptimizationSettings`] value; see [`crate::levels`] for the named
//! presets and speed-based selection.

use serde::{Deserialize, Serialize};

use crate::geo_utils::{cross_track_distance_m, haversine_distance, turn_angle_deg};
use crate::RoutePoint;

/// Thresholds controlling how aggressively points are dropped.
///
/// All retention rules are checked against the previous *retained* point,
/// not the previous raw point. Larger values in every field mean fewer
/// retained points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSettings {
    /// Max allowed perpendicular distance (meters) of a dropped point from
    /// the chord connecting its neighbors.
    pub max_deviation_m: f64,
    /// Points closer than this (meters) to the previous retained point are
    /// dropped regardless of deviation.
    pub min_distance_m: f64,
    /// A point farther than this (meters) from the previous retained point
    /// is always retained, bounding spatial gaps.
    pub max_distance_m: f64,
    /// A point is retained when the heading change at it meets this angle
    /// (degrees), preserving corners.
    pub angle_threshold_deg: f64,
    /// A point is always retained once this much time (seconds) has elapsed
    /// since the previous retained point, bounding temporal gaps.
    pub min_time_interval_s: f64,
}

impl OptimizationSettings {
    /// Component-wise `<=` against another settings value.
    ///
    /// When this holds, simplification with `self` retains at least as many
    /// points as simplification with `other`.
    pub fn is_gentler_than(&self, other: &OptimizationSettings) -> bool {
        self.max_deviation_m <= other.max_deviation_m
            && self.min_distance_m <= other.min_distance_m
            && self.max_distance_m <= other.max_distance_m
            && self.angle_threshold_deg <= other.angle_threshold_deg
            && self.min_time_interval_s <= other.min_time_interval_s
    }
}

/// Seconds elapsed from `a` to `b`, with sub-second precision.
fn elapsed_seconds(a: &RoutePoint, b: &RoutePoint) -> f64 {
    (b.timestamp - a.timestamp).num_milliseconds() as f64 / 1000.0
}

/// Reduce the density of an ordered point sequence while bounding geometric
/// deviation from the original path.
///
/// The input must already be sorted by timestamp; this function does not
/// re-sort. The first and last points are always retained, so the route's
/// start/end (and therefore its overall distance anchors and map bounds)
/// survive any settings.
///
/// Each interior point is scanned once, left to right, against the previous
/// retained point `prev` and its immediate successor `next`:
///
/// 1. retain unconditionally when the elapsed time since `prev` reaches
///    `min_time_interval_s`, the distance from `prev` reaches
///    `max_distance_m`, or the turn angle at the point reaches
///    `angle_threshold_deg`;
/// 2. otherwise drop when the point is within `min_distance_m` of `prev`
///    (jitter-scale movement, regardless of deviation);
/// 3. otherwise drop only when the perpendicular deviation from the chord
///    `prev`-`next` stays below `max_deviation_m`.
///
/// Sequences of two or fewer points are returned unchanged. The function is
/// total over well-formed ordered input.
pub fn simplify_track(points: &[RoutePoint], settings: &OptimizationSettings) -> Vec<RoutePoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut retained: Vec<RoutePoint> = Vec::with_capacity(points.len() / 2 + 2);
    retained.push(points[0]);
    let mut prev = points[0];

    for window in points.windows(2).skip(1) {
        let p = window[0];
        let next = window[1];

        let keep = {
            if elapsed_seconds(&prev, &p) >= settings.min_time_interval_s
                || haversine_distance(&prev, &p) >= settings.max_distance_m
                || turn_angle_deg(&prev, &p, &next) >= settings.angle_threshold_deg
            {
                true
            } else if haversine_distance(&prev, &p) < settings.min_distance_m {
                false
            } else {
                cross_track_distance_m(&p, &prev, &next) >= settings.max_deviation_m
            }
        };

        if keep {
            retained.push(p);
            prev = p;
        }
    }

    // Endpoint preservation: the last input point is always part of the result.
    retained.push(points[points.len() - 1]);
    retained
}

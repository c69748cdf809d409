//! Trip analytics derived from an ordered point collection.
//!
//! Everything here is a pure function of the points passed in: there is no
//! cached state to invalidate beyond "call [`analyze`] again after the point
//! collection changes". Callers recompute after any mutation or after
//! compression changes the retained set.

use serde::{Deserialize, Serialize};

use crate::geo_utils::haversine_distance;
use crate::{RoutePoint, INVALID_ALTITUDE_M};

/// Consecutive fixes farther apart in time than this are treated as a gap
/// (GPS dropout or a genuine long pause) and contribute nothing to moving
/// time. Without this, a stationary hour misrecorded as one giant segment
/// would inflate moving time.
const MAX_SEGMENT_GAP_S: f64 = 300.0;

/// Below this segment speed (~1.8 km/h) the device is essentially
/// stationary with GPS jitter; such segments do not count as moving.
const MIN_MOVING_SPEED_MPS: f64 = 0.5;

/// Minimum cumulative altitude change before it is committed as gain or
/// loss. Suppresses GPS altitude noise registering as many tiny false
/// ascents.
const ELEVATION_HYSTERESIS_M: f64 = 2.5;

/// Lower commit bar for the residual after the walk, so small but real net
/// elevation at the end of a track is not dropped.
const ELEVATION_RESIDUAL_M: f64 = 1.0;

/// Half-width of the centered moving average applied to altitudes
/// (window size 3, clamped at the sequence boundaries).
const SMOOTHING_HALF_WINDOW: usize = 1;

/// Derived trip statistics. Recomputed, never persisted as source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TripAnalyticsSnapshot {
    /// Sum of great-circle distances between consecutive points, meters.
    pub total_distance_m: f64,
    /// Elapsed time excluding gaps and stationary intervals, seconds.
    pub moving_time_s: f64,
    /// Distance covered while moving divided by moving time, m/s.
    pub average_moving_speed_mps: f64,
    /// Noise-resistant cumulative ascent, meters.
    pub elevation_gain_m: f64,
    /// Noise-resistant cumulative descent, meters.
    pub elevation_loss_m: f64,
}

/// Compute a [`TripAnalyticsSnapshot`] from an ordered point sequence.
///
/// Total over any input: empty and single-point collections yield the
/// all-zero snapshot.
pub fn analyze(points: &[RoutePoint]) -> TripAnalyticsSnapshot {
    let total_distance_m = crate::geo_utils::polyline_length(points);
    let (moving_time_s, moving_distance_m) = moving_segments(points);
    let (elevation_gain_m, elevation_loss_m) = elevation_gain_loss(points);

    let average_moving_speed_mps = if moving_time_s > 0.0 {
        moving_distance_m / moving_time_s
    } else {
        0.0
    };

    TripAnalyticsSnapshot {
        total_distance_m,
        moving_time_s,
        average_moving_speed_mps,
        elevation_gain_m,
        elevation_loss_m,
    }
}

/// Accumulate (moving time, moving distance) over consecutive pairs.
fn moving_segments(points: &[RoutePoint]) -> (f64, f64) {
    let mut moving_time = 0.0;
    let mut moving_distance = 0.0;

    for w in points.windows(2) {
        let dt = (w[1].timestamp - w[0].timestamp).num_milliseconds() as f64 / 1000.0;
        if dt <= 0.0 || dt > MAX_SEGMENT_GAP_S {
            continue;
        }

        let dist = haversine_distance(&w[0], &w[1]);
        if dist / dt > MIN_MOVING_SPEED_MPS {
            moving_time += dt;
            moving_distance += dist;
        }
    }

    (moving_time, moving_distance)
}

/// Noise-resistant elevation gain/loss over the valid altitude series.
///
/// Altitudes at or below the invalid sentinel are discarded, the rest are
/// smoothed with a centered moving average, and changes are committed
/// through a hysteresis accumulator.
fn elevation_gain_loss(points: &[RoutePoint]) -> (f64, f64) {
    let altitudes: Vec<f64> = points
        .iter()
        .filter(|p| p.altitude > INVALID_ALTITUDE_M)
        .map(|p| p.altitude)
        .collect();

    if altitudes.len() < 2 {
        return (0.0, 0.0);
    }

    let smoothed = smooth(&altitudes);

    let mut gain = 0.0;
    let mut loss = 0.0;
    let mut cumulative = 0.0;

    for w in smoothed.windows(2) {
        cumulative += w[1] - w[0];
        if cumulative.abs() >= ELEVATION_HYSTERESIS_M {
            if cumulative > 0.0 {
                gain += cumulative;
            } else {
                loss -= cumulative;
            }
            cumulative = 0.0;
        }
    }

    if cumulative.abs() >= ELEVATION_RESIDUAL_M {
        if cumulative > 0.0 {
            gain += cumulative;
        } else {
            loss -= cumulative;
        }
    }

    (gain, loss)
}

/// Centered moving average, window clamped at the boundaries.
fn smooth(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let lo = i.saturating_sub(SMOOTHING_HALF_WINDOW);
            let hi = (i + SMOOTHING_HALF_WINDOW).min(values.len() - 1);
            let window = &values[lo..=hi];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

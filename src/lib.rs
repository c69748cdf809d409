//! # Track Optimizer
//!
//! Adaptive GPS track simplification, segment compression and trip
//! analytics.
//!
//! This library keeps the storage and rendering cost of recorded trips low
//! without discarding the shape of the route:
//! - Speed-adaptive point decimation with bounded geometric deviation
//! - A five-level optimization ladder with automatic speed-based selection
//! - Segment-based compression bookkeeping with aggregate savings
//! - Pause-aware, noise-resistant trip analytics
//! - Manual track-editing primitives that keep points and analytics
//!   consistent
//!
//! The crate operates purely on in-memory ordered point collections and
//! settings values. Persistence, map rendering, GPX serialization and the
//! location provider are external collaborators: callers hand points in and
//! get points and statistics back.
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch compression with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use track_optimizer::{analyze, select_settings, simplify_track, RoutePoint, SelectionMode};
//!
//! let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
//! let track: Vec<RoutePoint> = (0..60)
//!     .map(|i| {
//!         RoutePoint::new(
//!             52.0 + i as f64 * 0.0001,
//!             13.0,
//!             40.0,
//!             11.0,
//!             t0 + Duration::seconds(i),
//!         )
//!     })
//!     .collect();
//!
//! // Pick settings from the current speed sample, then decimate
//! let settings = select_settings(&SelectionMode::Automatic, 11.0);
//! let reduced = simplify_track(&track, &settings);
//! assert!(reduced.len() <= track.len());
//!
//! // Derived trip statistics, recomputed on demand
//! let stats = analyze(&track);
//! assert!(stats.total_distance_m > 0.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrackError};

// Geographic utilities (distance, bearing, deviation calculations)
pub mod geo_utils;

// Streaming point decimation
pub mod simplify;
pub use simplify::{simplify_track, OptimizationSettings};

// Optimization level selection (speed -> decimation aggressiveness)
pub mod levels;
pub use levels::{
    level_for_speed, select_level, select_settings, OptimizationLevel, SelectionMode,
    SpeedThresholds,
};

// Trip analytics (distance, moving time, elevation)
pub mod analytics;
pub use analytics::{analyze, TripAnalyticsSnapshot};

// Segment storage and compression bookkeeping
pub mod storage;
pub use storage::{
    CompressionOutcome, SegmentId, StorageStats, TrackSegment, TrackStorageManager,
};

// Manual track editing
pub mod editor;
pub use editor::TrackEditor;

// Algorithm toolbox - modular access to all algorithms
// Use track_optimizer::algorithms::{...} for standalone algorithm access
pub mod algorithms;

// ============================================================================
// Core Types
// ============================================================================

/// Altitudes at or below this value (meters) are the sentinel for "no fix"
/// and are ignored by elevation analytics.
pub const INVALID_ALTITUDE_M: f64 = -100.0;

/// A single recorded GPS fix.
///
/// Points belong to exactly one trip and are ordered by `timestamp` within
/// it (ties broken by insertion order); keeping a collection ordered after
/// mutation is the responsibility of [`TrackEditor`] and
/// [`TrackStorageManager`], not of this type.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use track_optimizer::RoutePoint;
/// let point = RoutePoint::new(51.5074, -0.1278, 11.0, 1.4, Utc::now()); // London
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters; may be below sea level. Values at or below
    /// [`INVALID_ALTITUDE_M`] mean the receiver had no altitude fix.
    pub altitude: f64,
    /// Meters per second; zero or negative means unknown.
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
}

impl RoutePoint {
    /// Create a new route point.
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        speed: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            speed,
            timestamp,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Whether the altitude field carries a real fix.
    pub fn has_altitude(&self) -> bool {
        self.altitude > INVALID_ALTITUDE_M
    }
}

/// Bounding box for a track or segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from route points. Returns `None` for empty input.
    pub fn from_points(points: &[RoutePoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Center of the bounds as a (latitude, longitude) pair.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pt(lat: f64, lng: f64) -> RoutePoint {
        RoutePoint::new(lat, lng, 40.0, 0.0, Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn test_route_point_validation() {
        assert!(pt(51.5074, -0.1278).is_valid());
        assert!(!pt(91.0, 0.0).is_valid());
        assert!(!pt(0.0, 181.0).is_valid());
        assert!(!pt(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_altitude_sentinel() {
        let mut p = pt(51.5, -0.12);
        assert!(p.has_altitude());
        p.altitude = -100.0;
        assert!(!p.has_altitude());
        p.altitude = -40.0; // below sea level but real
        assert!(p.has_altitude());
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points(&[
            pt(51.50, -0.13),
            pt(51.51, -0.12),
            pt(51.505, -0.125),
        ])
        .unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);

        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_center() {
        let bounds = Bounds::from_points(&[pt(51.50, -0.10), pt(51.52, -0.12)]).unwrap();
        let (lat, lng) = bounds.center();
        assert!((lat - 51.51).abs() < 1e-9);
        assert!((lng - (-0.11)).abs() < 1e-9);
    }
}

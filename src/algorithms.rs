//! # Algorithm Toolbox
//!
//! This module provides direct access to all track-processing algorithms.
//! Use these for integrating specific algorithms into your own systems
//! without needing the storage manager or editor.
//!
//! ## Core Algorithms
//!
//! - **Streaming Simplification**: speed-adaptive point decimation
//! - **Level Selection**: speed to decimation-aggressiveness mapping
//! - **Trip Analytics**: distance, moving time, elevation gain/loss
//!
//! ## Geographic Utilities
//!
//! - **Haversine Distance**: great-circle distance between GPS points
//! - **Polyline Length**: total distance along a path
//! - **Turn Angle / Bearing**: heading change at a point
//! - **Cross-Track Distance**: perpendicular deviation from a chord
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use track_optimizer::algorithms::{
//!     haversine_distance, select_settings, simplify_track,
//!     RoutePoint, SelectionMode,
//! };
//!
//! let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
//! let berlin = RoutePoint::new(52.52, 13.405, 34.0, 0.0, t0);
//! let potsdam = RoutePoint::new(52.39, 13.065, 35.0, 0.0, t0 + Duration::hours(1));
//! let distance = haversine_distance(&berlin, &potsdam);
//! println!("Berlin to Potsdam: {:.0} km", distance / 1000.0);
//!
//! // Settings for a cycling-speed fix (5 m/s)
//! let settings = select_settings(&SelectionMode::Automatic, 5.0);
//! let reduced = simplify_track(&[berlin, potsdam], &settings);
//! assert_eq!(reduced.len(), 2);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Bounds, RoutePoint};

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geo_utils::{
    bearing_deg, cross_track_distance_m, haversine_distance, meters_to_degrees, polyline_length,
    turn_angle_deg,
};

// =============================================================================
// Streaming Simplification
// =============================================================================

/// Speed-adaptive streaming point decimation.
///
/// Single-pass, greedy variant of line simplification. Endpoints are always
/// retained; interior points survive on time, distance or corner rules and
/// are otherwise dropped when their chord deviation is below the threshold.
pub use crate::simplify::simplify_track;
pub use crate::simplify::OptimizationSettings;

// =============================================================================
// Optimization Level Selection
// =============================================================================

/// Map an instantaneous speed sample to one of the five presets.
pub use crate::levels::level_for_speed;
/// Resolve the settings to apply for one fix, given a selection mode.
pub use crate::levels::{select_level, select_settings};
pub use crate::levels::{OptimizationLevel, SelectionMode, SpeedThresholds};

// =============================================================================
// Trip Analytics
// =============================================================================

/// Distance, pause-aware moving time/speed and smoothed elevation gain/loss.
pub use crate::analytics::analyze;
pub use crate::analytics::TripAnalyticsSnapshot;

// =============================================================================
// Segment Storage & Compression
// =============================================================================

pub use crate::storage::{
    CompressionOutcome, SegmentId, StorageStats, TrackSegment, TrackStorageManager,
    POINT_STORAGE_BYTES,
};

// =============================================================================
// Track Editing
// =============================================================================

pub use crate::editor::TrackEditor;

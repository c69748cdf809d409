//! Optimization-level selection.
//!
//! Maps an observed speed sample (or a fixed user choice) to the
//! [`OptimizationSettings`] the simplifier should apply. The five named
//! levels form a monotone ladder: every threshold of a level is greater
//! than or equal to the same threshold one level down, so a higher level
//! never retains more points than a lower one.
//!
//! Selection is a pure mapping with no side effects; the live-tracking loop
//! re-evaluates it on every incoming fix.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::simplify::OptimizationSettings;

/// Meters per second to kilometers per hour.
const MPS_TO_KMH: f64 = 3.6;

/// Level applied when a custom threshold table fails validation.
const FALLBACK_LEVEL: OptimizationLevel = OptimizationLevel::Level2;

/// Named decimation aggressiveness presets.
///
/// `Level1` is conservative (walking-scale detail), `Level5` aggressive
/// (highway-scale detail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizationLevel {
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
}

/// Preset table, keyed by level. Magnitudes are tuning constants; the
/// monotone-ladder property is what the rest of the system relies on and is
/// asserted by tests.
static LEVEL_PRESETS: Lazy<HashMap<OptimizationLevel, OptimizationSettings>> = Lazy::new(|| {
    HashMap::from([
        (
            OptimizationLevel::Level1,
            OptimizationSettings {
                max_deviation_m: 1.0,
                min_distance_m: 2.0,
                max_distance_m: 50.0,
                angle_threshold_deg: 15.0,
                min_time_interval_s: 10.0,
            },
        ),
        (
            OptimizationLevel::Level2,
            OptimizationSettings {
                max_deviation_m: 2.5,
                min_distance_m: 5.0,
                max_distance_m: 100.0,
                angle_threshold_deg: 25.0,
                min_time_interval_s: 20.0,
            },
        ),
        (
            OptimizationLevel::Level3,
            OptimizationSettings {
                max_deviation_m: 5.0,
                min_distance_m: 10.0,
                max_distance_m: 200.0,
                angle_threshold_deg: 35.0,
                min_time_interval_s: 40.0,
            },
        ),
        (
            OptimizationLevel::Level4,
            OptimizationSettings {
                max_deviation_m: 9.0,
                min_distance_m: 18.0,
                max_distance_m: 400.0,
                angle_threshold_deg: 50.0,
                min_time_interval_s: 80.0,
            },
        ),
        (
            OptimizationLevel::Level5,
            OptimizationSettings {
                max_deviation_m: 15.0,
                min_distance_m: 30.0,
                max_distance_m: 800.0,
                angle_threshold_deg: 70.0,
                min_time_interval_s: 150.0,
            },
        ),
    ])
});

impl OptimizationLevel {
    /// The simplifier thresholds for this level.
    pub fn settings(&self) -> OptimizationSettings {
        LEVEL_PRESETS[self]
    }

    /// All levels, ordered from conservative to aggressive.
    pub fn all() -> [OptimizationLevel; 5] {
        [
            OptimizationLevel::Level1,
            OptimizationLevel::Level2,
            OptimizationLevel::Level3,
            OptimizationLevel::Level4,
            OptimizationLevel::Level5,
        ]
    }
}

/// Speed boundaries (km/h) mapping an instantaneous speed sample to a level.
///
/// Boundaries must be strictly increasing; [`SpeedThresholds::validate`]
/// enforces this at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedThresholds {
    pub walking_max_kmh: f64,
    pub cycling_max_kmh: f64,
    pub moped_max_kmh: f64,
    pub driving_max_kmh: f64,
}

impl Default for SpeedThresholds {
    fn default() -> Self {
        Self {
            walking_max_kmh: 7.0,
            cycling_max_kmh: 25.0,
            moped_max_kmh: 45.0,
            driving_max_kmh: 90.0,
        }
    }
}

impl SpeedThresholds {
    /// Check that the boundaries are finite, positive and strictly increasing.
    pub fn validate(&self) -> Result<()> {
        let ordered = [
            self.walking_max_kmh,
            self.cycling_max_kmh,
            self.moped_max_kmh,
            self.driving_max_kmh,
        ];

        if ordered.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(TrackError::MalformedThresholds {
                message: "boundaries must be finite and positive".to_string(),
            });
        }
        if ordered.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TrackError::MalformedThresholds {
                message: format!(
                    "boundaries must be strictly increasing, got {:?}",
                    ordered
                ),
            });
        }
        Ok(())
    }
}

/// How the live-tracking loop chooses a level for each incoming fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Always apply this level, ignoring speed.
    Fixed(OptimizationLevel),
    /// Bucket the speed sample against the built-in boundaries.
    Automatic,
    /// Bucket against user-overridden boundaries; falls back to
    /// [`FALLBACK_LEVEL`] when the table is malformed.
    Custom(SpeedThresholds),
}

/// Map a speed in km/h to a level using the given boundaries.
pub fn level_for_speed(speed_kmh: f64, thresholds: &SpeedThresholds) -> OptimizationLevel {
    if speed_kmh <= thresholds.walking_max_kmh {
        OptimizationLevel::Level1
    } else if speed_kmh <= thresholds.cycling_max_kmh {
        OptimizationLevel::Level2
    } else if speed_kmh <= thresholds.moped_max_kmh {
        OptimizationLevel::Level3
    } else if speed_kmh <= thresholds.driving_max_kmh {
        OptimizationLevel::Level4
    } else {
        OptimizationLevel::Level5
    }
}

/// Resolve the settings to apply for one fix.
///
/// Pure mapping: `Fixed` ignores the speed sample entirely; `Automatic` and
/// `Custom` convert m/s to km/h and bucket against their boundary table.
/// Unknown speeds (zero or negative-as-unknown) select `Level1` so detail is
/// never discarded without speed evidence. A malformed custom table degrades
/// to [`FALLBACK_LEVEL`] with a warning instead of failing: level choice
/// tunes aggressiveness, it never affects the correctness of retained
/// points.
pub fn select_settings(mode: &SelectionMode, speed_mps: f64) -> OptimizationSettings {
    select_level(mode, speed_mps).settings()
}

/// Level-resolving counterpart of [`select_settings`].
pub fn select_level(mode: &SelectionMode, speed_mps: f64) -> OptimizationLevel {
    match mode {
        SelectionMode::Fixed(level) => *level,
        SelectionMode::Automatic => {
            if speed_mps <= 0.0 {
                return OptimizationLevel::Level1;
            }
            level_for_speed(speed_mps * MPS_TO_KMH, &SpeedThresholds::default())
        }
        SelectionMode::Custom(thresholds) => {
            if let Err(err) = thresholds.validate() {
                log::warn!("custom speed thresholds rejected ({}), using fallback", err);
                return FALLBACK_LEVEL;
            }
            if speed_mps <= 0.0 {
                return OptimizationLevel::Level1;
            }
            level_for_speed(speed_mps * MPS_TO_KMH, thresholds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_ladder_is_monotone() {
        let levels = OptimizationLevel::all();
        for pair in levels.windows(2) {
            let lower = pair[0].settings();
            let upper = pair[1].settings();
            assert!(
                lower.is_gentler_than(&upper),
                "{:?} must be component-wise <= {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_automatic_buckets() {
        // 1 m/s = 3.6 km/h: walking
        assert_eq!(
            select_level(&SelectionMode::Automatic, 1.0),
            OptimizationLevel::Level1
        );
        // 5 m/s = 18 km/h: cycling
        assert_eq!(
            select_level(&SelectionMode::Automatic, 5.0),
            OptimizationLevel::Level2
        );
        // 10 m/s = 36 km/h: moped
        assert_eq!(
            select_level(&SelectionMode::Automatic, 10.0),
            OptimizationLevel::Level3
        );
        // 20 m/s = 72 km/h: driving
        assert_eq!(
            select_level(&SelectionMode::Automatic, 20.0),
            OptimizationLevel::Level4
        );
        // 30 m/s = 108 km/h: highway
        assert_eq!(
            select_level(&SelectionMode::Automatic, 30.0),
            OptimizationLevel::Level5
        );
    }

    #[test]
    fn test_unknown_speed_is_conservative() {
        assert_eq!(
            select_level(&SelectionMode::Automatic, 0.0),
            OptimizationLevel::Level1
        );
        assert_eq!(
            select_level(&SelectionMode::Automatic, -1.0),
            OptimizationLevel::Level1
        );
    }

    #[test]
    fn test_fixed_ignores_speed() {
        let mode = SelectionMode::Fixed(OptimizationLevel::Level5);
        assert_eq!(select_level(&mode, 0.3), OptimizationLevel::Level5);
        assert_eq!(select_level(&mode, 40.0), OptimizationLevel::Level5);
    }

    #[test]
    fn test_custom_thresholds() {
        let custom = SpeedThresholds {
            walking_max_kmh: 5.0,
            cycling_max_kmh: 20.0,
            moped_max_kmh: 40.0,
            driving_max_kmh: 80.0,
        };
        let mode = SelectionMode::Custom(custom);
        // 6 m/s = 21.6 km/h: above the tighter cycling bound
        assert_eq!(select_level(&mode, 6.0), OptimizationLevel::Level3);
    }

    #[test]
    fn test_malformed_custom_falls_back() {
        let broken = SpeedThresholds {
            walking_max_kmh: 30.0,
            cycling_max_kmh: 25.0,
            moped_max_kmh: 45.0,
            driving_max_kmh: 90.0,
        };
        assert!(broken.validate().is_err());

        let mode = SelectionMode::Custom(broken);
        assert_eq!(select_level(&mode, 50.0), OptimizationLevel::Level2);
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let broken = SpeedThresholds {
            walking_max_kmh: 0.0,
            ..SpeedThresholds::default()
        };
        assert!(matches!(
            broken.validate(),
            Err(TrackError::MalformedThresholds { .. })
        ));
    }

    #[test]
    fn test_default_thresholds_are_valid() {
        assert!(SpeedThresholds::default().validate().is_ok());
    }
}

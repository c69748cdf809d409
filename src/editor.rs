//! Manual track-editing primitives.
//!
//! The editor owns a trip's live (uncompressed, currently-displayed) point
//! collection and keeps it consistent: the collection stays ordered by
//! timestamp after every mutation, and the derived
//! [`TripAnalyticsSnapshot`] is recomputed whenever a mutation succeeds.
//!
//! Edits are manual overrides: the editor never re-runs the simplifier on
//! its own, so a hand-placed point cannot be silently decimated away. The
//! caller decides what user-facing feedback to trigger from the returned
//! result; nothing here logs, vibrates or draws.

use chrono::Duration;

use crate::analytics::{analyze, TripAnalyticsSnapshot};
use crate::error::{Result, TrackError};
use crate::simplify::{simplify_track, OptimizationSettings};
use crate::RoutePoint;

/// Latitude bound for manual edits. Matches the Web-Mercator projection
/// limit of the consuming map surface, not the full geodetic range.
pub const MAX_EDIT_LATITUDE_DEG: f64 = 85.0;

/// Longitude bound for manual edits.
pub const MAX_EDIT_LONGITUDE_DEG: f64 = 180.0;

/// Mutation operations against a trip's live point collection.
pub struct TrackEditor {
    points: Vec<RoutePoint>,
    snapshot: TripAnalyticsSnapshot,
}

impl TrackEditor {
    /// Create an editor over a point collection.
    ///
    /// The points are (stably) sorted by timestamp so the ordering
    /// invariant holds regardless of what the caller hands in; ties keep
    /// their insertion order.
    pub fn new(mut points: Vec<RoutePoint>) -> Self {
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let snapshot = analyze(&points);
        Self { points, snapshot }
    }

    /// The current point collection, ordered by timestamp.
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Analytics for the current point collection. Recomputed after every
    /// successful mutation, so this is never stale.
    pub fn snapshot(&self) -> TripAnalyticsSnapshot {
        self.snapshot
    }

    /// Consume the editor and return the (ordered) collection.
    pub fn into_points(self) -> Vec<RoutePoint> {
        self.points
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert a synthetic point between two timestamp-adjacent points.
    ///
    /// The new point sits at the arithmetic midpoint of `p1`/`p2` (latitude,
    /// longitude and altitude), with zero speed and a timestamp of
    /// `p1 + 1s`, or the bisected interval when the two points are less
    /// than a second apart, so ordering is always preserved.
    ///
    /// Fails with [`TrackError::NotAdjacent`] when `p1` and `p2` are not
    /// consecutive in the current collection.
    pub fn insert_between(&mut self, p1: &RoutePoint, p2: &RoutePoint) -> Result<RoutePoint> {
        let idx = self
            .points
            .iter()
            .position(|p| p == p1)
            .ok_or_else(|| TrackError::NotAdjacent {
                message: "first point is not in the collection".to_string(),
            })?;

        if self.points.get(idx + 1) != Some(p2) {
            return Err(TrackError::NotAdjacent {
                message: format!(
                    "points at {} and {} are not consecutive",
                    p1.timestamp, p2.timestamp
                ),
            });
        }

        let gap = p2.timestamp - p1.timestamp;
        let timestamp = if gap < Duration::seconds(1) {
            p1.timestamp + gap / 2
        } else {
            p1.timestamp + Duration::seconds(1)
        };

        let new_point = RoutePoint::new(
            (p1.latitude + p2.latitude) / 2.0,
            (p1.longitude + p2.longitude) / 2.0,
            (p1.altitude + p2.altitude) / 2.0,
            0.0,
            timestamp,
        );

        self.points.insert(idx + 1, new_point);
        self.snapshot = analyze(&self.points);
        Ok(new_point)
    }

    /// Remove a point from the collection.
    ///
    /// Deletion is idempotent by identity: removing a point that is not
    /// present removes nothing and is not an error. Returns whether
    /// anything was removed.
    pub fn delete(&mut self, point: &RoutePoint) -> bool {
        let before = self.points.len();
        self.points.retain(|p| p != point);
        let removed = self.points.len() < before;
        if removed {
            self.snapshot = analyze(&self.points);
        }
        removed
    }

    /// Remove several points at once. Returns how many were removed.
    pub fn delete_many(&mut self, points: &[RoutePoint]) -> usize {
        let before = self.points.len();
        self.points.retain(|p| !points.contains(p));
        let removed = before - self.points.len();
        if removed > 0 {
            self.snapshot = analyze(&self.points);
        }
        removed
    }

    /// Move a point to new coordinates.
    ///
    /// Fails with [`TrackError::OutOfRange`] when the target coordinates
    /// fall outside the supported latitude/longitude bounds; the point is
    /// left untouched. Moving a point that is not present is a no-op.
    pub fn move_point(&mut self, point: &RoutePoint, new_lat: f64, new_lon: f64) -> Result<()> {
        if !(-MAX_EDIT_LATITUDE_DEG..=MAX_EDIT_LATITUDE_DEG).contains(&new_lat)
            || !(-MAX_EDIT_LONGITUDE_DEG..=MAX_EDIT_LONGITUDE_DEG).contains(&new_lon)
        {
            return Err(TrackError::OutOfRange {
                latitude: new_lat,
                longitude: new_lon,
            });
        }

        if let Some(target) = self.points.iter_mut().find(|p| **p == *point) {
            target.latitude = new_lat;
            target.longitude = new_lon;
            self.snapshot = analyze(&self.points);
        }
        Ok(())
    }

    // ========================================================================
    // Re-simplification
    // ========================================================================

    /// Explicit user-triggered re-simplification of the current collection.
    ///
    /// Returns the reduced set without mutating the editor; the caller is
    /// responsible for diffing against the previous set and deleting the
    /// points absent from the result.
    pub fn optimize(&self, settings: &OptimizationSettings) -> Vec<RoutePoint> {
        simplify_track(&self.points, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn pt(lat: f64, lng: f64, secs: i64) -> RoutePoint {
        RoutePoint::new(lat, lng, 40.0, 1.0, t0() + Duration::seconds(secs))
    }

    fn sample_editor() -> TrackEditor {
        TrackEditor::new(vec![
            pt(52.0, 13.0, 0),
            pt(52.01, 13.01, 10),
            pt(52.02, 13.02, 20),
        ])
    }

    #[test]
    fn test_insert_midpoint() {
        let mut editor = sample_editor();
        let p1 = editor.points()[0];
        let p2 = editor.points()[1];

        let inserted = editor.insert_between(&p1, &p2).unwrap();
        assert_eq!(inserted.latitude, 52.005);
        assert_eq!(inserted.longitude, 13.005);
        assert_eq!(inserted.speed, 0.0);
        assert_eq!(inserted.timestamp, t0() + Duration::seconds(1));
        assert_eq!(editor.points().len(), 4);
        assert_eq!(editor.points()[1], inserted);
    }

    #[test]
    fn test_insert_bisects_small_gaps() {
        let mut editor = TrackEditor::new(vec![
            pt(52.0, 13.0, 0),
            RoutePoint::new(52.001, 13.0, 40.0, 1.0, t0() + Duration::milliseconds(500)),
        ]);
        let p1 = editor.points()[0];
        let p2 = editor.points()[1];

        let inserted = editor.insert_between(&p1, &p2).unwrap();
        assert_eq!(inserted.timestamp, t0() + Duration::milliseconds(250));
    }

    #[test]
    fn test_insert_non_adjacent_fails() {
        let mut editor = sample_editor();
        let p1 = editor.points()[0];
        let p3 = editor.points()[2];

        let result = editor.insert_between(&p1, &p3);
        assert!(matches!(result, Err(TrackError::NotAdjacent { .. })));
        assert_eq!(editor.points().len(), 3);
    }

    #[test]
    fn test_ordering_preserved_after_insert() {
        let mut editor = sample_editor();
        let p1 = editor.points()[1];
        let p2 = editor.points()[2];
        editor.insert_between(&p1, &p2).unwrap();

        let ordered = editor
            .points()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp);
        assert!(ordered);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut editor = sample_editor();
        let victim = editor.points()[1];

        assert!(editor.delete(&victim));
        assert_eq!(editor.points().len(), 2);

        // Deleting again removes nothing and does not error
        assert!(!editor.delete(&victim));
        assert_eq!(editor.points().len(), 2);
    }

    #[test]
    fn test_delete_many() {
        let mut editor = sample_editor();
        let victims = vec![editor.points()[0], editor.points()[2], pt(0.0, 0.0, 999)];
        assert_eq!(editor.delete_many(&victims), 2);
        assert_eq!(editor.points().len(), 1);
    }

    #[test]
    fn test_move_out_of_range_rejected() {
        let mut editor = sample_editor();
        let target = editor.points()[1];

        let result = editor.move_point(&target, 90.5, 13.0);
        assert_eq!(
            result,
            Err(TrackError::OutOfRange {
                latitude: 90.5,
                longitude: 13.0
            })
        );
        // Original coordinates intact
        assert_eq!(editor.points()[1].latitude, 52.01);
        assert_eq!(editor.points()[1].longitude, 13.01);
    }

    #[test]
    fn test_move_updates_coordinates() {
        let mut editor = sample_editor();
        let target = editor.points()[1];
        let before = editor.snapshot();

        editor.move_point(&target, 52.5, 13.5).unwrap();
        assert_eq!(editor.points()[1].latitude, 52.5);
        assert_eq!(editor.points()[1].longitude, 13.5);

        // Analytics followed the mutation
        assert!(editor.snapshot().total_distance_m > before.total_distance_m);
    }

    #[test]
    fn test_snapshot_recomputed_on_insert() {
        let mut editor = sample_editor();
        let before = editor.snapshot();
        let p1 = editor.points()[0];
        let p2 = editor.points()[1];

        editor.insert_between(&p1, &p2).unwrap();
        // The midpoint lies on the chord, so distance is unchanged within
        // tolerance but the snapshot must have been recomputed over 4 points
        let after = editor.snapshot();
        assert!((after.total_distance_m - before.total_distance_m).abs() < 1.0);
    }

    #[test]
    fn test_optimize_does_not_mutate() {
        let points: Vec<RoutePoint> = (0..30)
            .map(|i| pt(52.0 + i as f64 * 0.0001, 13.0, i))
            .collect();
        let editor = TrackEditor::new(points);

        let settings = OptimizationSettings {
            max_deviation_m: 5.0,
            min_distance_m: 8.0,
            max_distance_m: 500.0,
            angle_threshold_deg: 40.0,
            min_time_interval_s: 600.0,
        };
        let reduced = editor.optimize(&settings);
        assert!(reduced.len() < editor.points().len());
        assert_eq!(editor.points().len(), 30);
    }
}

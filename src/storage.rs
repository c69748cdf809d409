//! # Track Storage Manager
//!
//! Segment-based storage and compression bookkeeping for a trip's recorded
//! points. Live ingestion appends to an open buffer; once the buffer is old
//! or large enough it is sealed into a [`TrackSegment`], the unit of
//! compression.
//!
//! ## Architecture
//!
//! The manager is an explicit service object constructed by the caller and
//! passed by handle wherever it is needed; there is no ambient global
//! instance. Sealed segments live behind their own mutex, so a background
//! worker can compress one segment while ingestion (which only touches the
//! open buffer through `&mut self`) keeps running, and two compressions of
//! the same segment can never race. Editor sessions mark a segment as
//! in-edit, which removes it from the compression-eligible set.
//!
//! Compression is one-way: a compressed segment is never decompressed in
//! place, and recompressing it is an idempotent no-op reporting zero
//! additional savings.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::levels::OptimizationLevel;
use crate::simplify::simplify_track;
use crate::{Bounds, RoutePoint};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Identifier of a sealed segment, unique within one manager.
pub type SegmentId = u64;

/// Assumed storage footprint of one point: four f64 fields plus an 8-byte
/// timestamp. Used to estimate saved space from point-count reduction.
pub const POINT_STORAGE_BYTES: u64 = 40;

/// An open buffer seals once it spans this much recording time.
const SEGMENT_MAX_DURATION_S: i64 = 600;

/// An open buffer seals once it holds this many points.
const SEGMENT_MAX_POINTS: usize = 1000;

// ============================================================================
// Segment
// ============================================================================

/// A contiguous, time-bounded slice of a trip's points plus its compression
/// state. Created when the open buffer seals, destroyed only when the owning
/// trip is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSegment {
    pub id: SegmentId,
    points: Vec<RoutePoint>,
    pub is_compressed: bool,
    pub original_point_count: usize,
    pub retained_point_count: usize,
    #[serde(skip)]
    in_edit: bool,
}

impl TrackSegment {
    fn new(id: SegmentId, points: Vec<RoutePoint>) -> Self {
        let count = points.len();
        Self {
            id,
            points,
            is_compressed: false,
            original_point_count: count,
            retained_point_count: count,
            in_edit: false,
        }
    }

    /// The segment's current (possibly compressed) point set.
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Timestamp of the first point.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.points.first().map(|p| p.timestamp)
    }

    /// Timestamp of the last point.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.timestamp)
    }

    /// Bounding box of the segment, for map framing.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ============================================================================
// Outcome / Statistics Types
// ============================================================================

/// Report of one compression run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionOutcome {
    pub segment_id: SegmentId,
    pub points_before: usize,
    pub points_after: usize,
    pub saved_bytes: u64,
    /// True when the segment was already compressed and nothing changed.
    pub already_compressed: bool,
}

/// Aggregate storage statistics across all sealed segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_segments: usize,
    pub compressed_segments: usize,
    pub saved_space_bytes: u64,
    /// `sum(retained) / sum(original)` across compressed segments;
    /// 1.0 when nothing is compressed yet.
    pub compression_ratio: f64,
}

// ============================================================================
// Storage Manager
// ============================================================================

/// Per-trip segmentation and compression state.
pub struct TrackStorageManager {
    segments: HashMap<SegmentId, Arc<Mutex<TrackSegment>>>,
    open_buffer: Vec<RoutePoint>,
    next_segment_id: SegmentId,
    archive_level: OptimizationLevel,
}

impl TrackStorageManager {
    /// Create a manager with the default archival compression level.
    ///
    /// The archival default is more aggressive than any live-tracking
    /// default because sealed segments are no longer actively viewed or
    /// edited.
    pub fn new() -> Self {
        Self::with_archive_level(OptimizationLevel::Level4)
    }

    /// Create a manager with a custom archival compression level.
    pub fn with_archive_level(archive_level: OptimizationLevel) -> Self {
        Self {
            segments: HashMap::new(),
            open_buffer: Vec::new(),
            next_segment_id: 0,
            archive_level,
        }
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Append one fix to the open buffer, sealing it into a segment when it
    /// becomes old or large enough.
    ///
    /// Returns the id of the newly sealed segment, if sealing occurred.
    pub fn ingest(&mut self, point: RoutePoint) -> Option<SegmentId> {
        self.open_buffer.push(point);

        let should_seal = self.open_buffer.len() >= SEGMENT_MAX_POINTS
            || self.open_buffer_span_s() >= SEGMENT_MAX_DURATION_S;

        if should_seal {
            self.seal_open_buffer()
        } else {
            None
        }
    }

    /// Append a batch of fixes in order.
    pub fn ingest_all<I: IntoIterator<Item = RoutePoint>>(&mut self, points: I) -> Vec<SegmentId> {
        points.into_iter().filter_map(|p| self.ingest(p)).collect()
    }

    /// Seal the open buffer into a segment regardless of its age or size
    /// (e.g. when recording stops). Empty buffers seal to nothing.
    pub fn seal_open_buffer(&mut self) -> Option<SegmentId> {
        if self.open_buffer.is_empty() {
            return None;
        }

        let id = self.next_segment_id;
        self.next_segment_id += 1;

        let points = std::mem::take(&mut self.open_buffer);
        log::debug!("sealed segment {} with {} points", id, points.len());

        self.segments
            .insert(id, Arc::new(Mutex::new(TrackSegment::new(id, points))));
        Some(id)
    }

    fn open_buffer_span_s(&self) -> i64 {
        match (self.open_buffer.first(), self.open_buffer.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_seconds(),
            _ => 0,
        }
    }

    /// Number of points currently waiting in the open buffer.
    pub fn open_buffer_len(&self) -> usize {
        self.open_buffer.len()
    }

    // ========================================================================
    // Compression
    // ========================================================================

    /// Ids of segments whose last point is older than the cutoff and which
    /// are neither compressed nor being edited. Sorted for deterministic
    /// sweep order.
    pub fn segments_eligible_for_compression(&self, older_than: DateTime<Utc>) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self
            .segments
            .values()
            .filter_map(|handle| {
                let seg = handle.lock().ok()?;
                if seg.is_compressed || seg.in_edit {
                    return None;
                }
                match seg.end_time() {
                    Some(end) if end < older_than => Some(seg.id),
                    _ => None,
                }
            })
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Compress one segment with the archival settings level.
    ///
    /// Replaces the segment's point set with the simplified result, marks it
    /// compressed and records the point counts. Already-compressed segments
    /// return an outcome with zero additional savings. On failure the
    /// segment is left unmodified and safe to retry.
    pub fn compress(&self, segment_id: SegmentId) -> Result<CompressionOutcome> {
        let handle = self
            .segments
            .get(&segment_id)
            .ok_or(TrackError::SegmentNotFound { segment_id })?;

        let mut segment = handle.lock().map_err(|_| TrackError::CompressionFailed {
            segment_id,
            message: "segment lock poisoned".to_string(),
        })?;

        if segment.is_compressed {
            return Ok(CompressionOutcome {
                segment_id,
                points_before: segment.retained_point_count,
                points_after: segment.retained_point_count,
                saved_bytes: 0,
                already_compressed: true,
            });
        }

        let before = segment.points.len();
        let retained = simplify_track(&segment.points, &self.archive_level.settings());
        let after = retained.len();

        segment.points = retained;
        segment.is_compressed = true;
        segment.original_point_count = before;
        segment.retained_point_count = after;

        let saved_bytes = (before - after) as u64 * POINT_STORAGE_BYTES;
        log::info!(
            "compressed segment {}: {} -> {} points ({} bytes saved)",
            segment_id,
            before,
            after,
            saved_bytes
        );

        Ok(CompressionOutcome {
            segment_id,
            points_before: before,
            points_after: after,
            saved_bytes,
            already_compressed: false,
        })
    }

    /// Compress every eligible segment, returning one result per segment.
    ///
    /// With the `parallel` feature the sweep fans out across segments; the
    /// per-segment mutex still serializes any competing access.
    pub fn compress_eligible(
        &self,
        older_than: DateTime<Utc>,
    ) -> Vec<Result<CompressionOutcome>> {
        let ids = self.segments_eligible_for_compression(older_than);

        #[cfg(feature = "parallel")]
        let outcomes: Vec<Result<CompressionOutcome>> =
            ids.par_iter().map(|&id| self.compress(id)).collect();

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Result<CompressionOutcome>> =
            ids.iter().map(|&id| self.compress(id)).collect();

        outcomes
    }

    // ========================================================================
    // Edit Exclusion
    // ========================================================================

    /// Mark or unmark a segment as being actively edited. Edited segments
    /// are excluded from the compression-eligible set.
    pub fn set_editing(&self, segment_id: SegmentId, editing: bool) -> Result<()> {
        let handle = self
            .segments
            .get(&segment_id)
            .ok_or(TrackError::SegmentNotFound { segment_id })?;

        let mut segment = handle.lock().map_err(|_| TrackError::CompressionFailed {
            segment_id,
            message: "segment lock poisoned".to_string(),
        })?;
        segment.in_edit = editing;
        Ok(())
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Aggregate savings across all sealed segments.
    pub fn statistics(&self) -> StorageStats {
        let mut total_segments = 0;
        let mut compressed_segments = 0;
        let mut original_sum: u64 = 0;
        let mut retained_sum: u64 = 0;

        for handle in self.segments.values() {
            let Ok(segment) = handle.lock() else { continue };
            total_segments += 1;
            if segment.is_compressed {
                compressed_segments += 1;
                original_sum += segment.original_point_count as u64;
                retained_sum += segment.retained_point_count as u64;
            }
        }

        let compression_ratio = if original_sum > 0 {
            retained_sum as f64 / original_sum as f64
        } else {
            1.0
        };

        StorageStats {
            total_segments,
            compressed_segments,
            saved_space_bytes: (original_sum - retained_sum) * POINT_STORAGE_BYTES,
            compression_ratio,
        }
    }

    /// Statistics as JSON (for efficient FFI/UI transfer).
    pub fn statistics_json(&self) -> String {
        serde_json::to_string(&self.statistics()).unwrap_or_else(|_| "{}".to_string())
    }

    // ========================================================================
    // Access / Lifecycle
    // ========================================================================

    /// Handle to a sealed segment. Callers lock it for reading or editing;
    /// holding the lock excludes concurrent compression of that segment.
    pub fn segment(&self, segment_id: SegmentId) -> Option<Arc<Mutex<TrackSegment>>> {
        self.segments.get(&segment_id).cloned()
    }

    /// All sealed segment ids, sorted.
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self.segments.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of sealed segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Drop all segments and the open buffer (trip deletion).
    pub fn clear(&mut self) {
        self.segments.clear();
        self.open_buffer.clear();
        self.next_segment_id = 0;
    }
}

impl Default for TrackStorageManager {
    fn default() -> Self {
        Self::new()
    }
}

//! Unified error handling for the track-optimizer library.
//!
//! This module provides a consistent error type for all track-optimizer
//! operations. Geometry and analytics functions are total and never fail;
//! mutation and compression operations fail explicitly and leave the data
//! structure unchanged on failure.

use std::fmt;

/// Unified error type for track-optimizer operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A proposed coordinate mutation falls outside the supported bounds
    OutOfRange {
        latitude: f64,
        longitude: f64,
    },
    /// An insertion was requested between two points that are not consecutive
    NotAdjacent { message: String },
    /// A segment id was not found in the storage manager
    SegmentNotFound { segment_id: u64 },
    /// Compression could not run; the segment was left unmodified
    CompressionFailed {
        segment_id: u64,
        message: String,
    },
    /// A custom speed-threshold table is not strictly increasing
    MalformedThresholds { message: String },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::OutOfRange {
                latitude,
                longitude,
            } => {
                write!(
                    f,
                    "Coordinates ({}, {}) are outside the editable range",
                    latitude, longitude
                )
            }
            TrackError::NotAdjacent { message } => {
                write!(f, "Points are not adjacent: {}", message)
            }
            TrackError::SegmentNotFound { segment_id } => {
                write!(f, "Segment {} not found", segment_id)
            }
            TrackError::CompressionFailed {
                segment_id,
                message,
            } => {
                write!(f, "Compression of segment {} failed: {}", segment_id, message)
            }
            TrackError::MalformedThresholds { message } => {
                write!(f, "Malformed speed thresholds: {}", message)
            }
        }
    }
}

impl std::error::Error for TrackError {}

/// Result type alias for track-optimizer operations.
pub type Result<T> = std::result::Result<T, TrackError>;

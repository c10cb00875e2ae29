//! Error types for the catalog server and bulk import

use airtime_core::{AirtimeError, DownloadError, LookupError, TrackId};
use thiserror::Error;

/// `lookup_track` failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupTrackError {
    #[error(transparent)]
    NotFound(#[from] LookupError),

    /// Track is longer than the configured ceiling
    #[error("'{query}' is {duration}s long, the limit is {max}s")]
    DurationExceeded { query: String, duration: u32, max: u32 },
}

/// `add_track` failures; nothing is added when any of these is returned
#[derive(Debug, Error)]
pub enum AddTrackError {
    #[error(transparent)]
    Lookup(LookupError),

    #[error("'{query}' is {duration}s long, the limit is {max}s")]
    DurationExceeded { query: String, duration: u32, max: u32 },

    #[error("Track already in catalog: {0}")]
    AlreadyExists(TrackId),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Storage error: {0}")]
    Storage(#[from] AirtimeError),
}

impl From<LookupTrackError> for AddTrackError {
    fn from(err: LookupTrackError) -> Self {
        match err {
            LookupTrackError::NotFound(e) => Self::Lookup(e),
            LookupTrackError::DurationExceeded { query, duration, max } => {
                Self::DurationExceeded { query, duration, max }
            }
        }
    }
}

/// Bulk import failures that abort the whole batch
///
/// Per-track failures are not errors; they are collected in the report.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid playlist: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] AirtimeError),

    #[error("Import task failed: {0}")]
    Task(String),
}

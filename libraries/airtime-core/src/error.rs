/// Core error types for Airtime
use crate::types::TrackId;
use thiserror::Error;

/// Result type alias using `AirtimeError`
pub type Result<T> = std::result::Result<T, AirtimeError>;

/// Core error type for catalog persistence and shared plumbing
#[derive(Error, Debug)]
pub enum AirtimeError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Duplicate entry
    #[error("Duplicate entry: {0}")]
    Duplicate(TrackId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl AirtimeError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for AirtimeError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// The resolver could not find or parse the requested track.
///
/// Recoverable: surfaced to the immediate caller, never fatal to the queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Lookup failed for '{query}': {reason}")]
pub struct LookupError {
    /// The free-text query, URL or track id that was looked up
    pub query: String,
    pub reason: String,
}

impl LookupError {
    pub fn new(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            reason: reason.into(),
        }
    }
}

/// Materializing a track's audio failed after a successful lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Download failed for {track_id}: {reason}")]
pub struct DownloadError {
    pub track_id: TrackId,
    pub reason: String,
}

impl DownloadError {
    pub fn new(track_id: TrackId, reason: impl Into<String>) -> Self {
        Self {
            track_id,
            reason: reason.into(),
        }
    }
}

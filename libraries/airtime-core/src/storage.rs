//! Storage trait for the persisted catalog

use crate::error::Result;
use crate::types::{Track, TrackId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable table of known tracks
///
/// This trait abstracts catalog persistence so the catalog server can run
/// against `SQLite` in production and against mocks in tests.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load every persisted track, ordered by title
    async fn load_all(&self) -> Result<Vec<Track>>;

    /// Whether a track with this id is persisted
    async fn contains(&self, id: &TrackId) -> Result<bool>;

    /// Insert a single track
    ///
    /// Fails with `AirtimeError::Duplicate` if the id already exists.
    async fn insert(&self, track: &Track) -> Result<()>;

    /// Insert many tracks in one transaction
    ///
    /// With `skip_conflicts` rows whose id already exists are left untouched
    /// (idempotent bulk loads); otherwise the first conflict aborts the batch.
    /// Returns the number of rows actually inserted.
    async fn insert_many(&self, tracks: &[Track], skip_conflicts: bool) -> Result<u64>;

    /// Case-insensitive substring search over titles, ordered by title
    async fn search(&self, term: &str) -> Result<Vec<Track>>;

    /// Persist a play timestamp
    async fn mark_played(&self, id: &TrackId, at: DateTime<Utc>) -> Result<()>;
}

/// `SQLite`-backed catalog store
use crate::tracks;
use airtime_core::{CatalogStore, Result, Track, TrackId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Catalog store over a `SQLite` pool
#[derive(Debug, Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn load_all(&self) -> Result<Vec<Track>> {
        tracks::get_all(&self.pool).await
    }

    async fn contains(&self, id: &TrackId) -> Result<bool> {
        tracks::exists(&self.pool, id).await
    }

    async fn insert(&self, track: &Track) -> Result<()> {
        tracks::insert(&self.pool, track).await
    }

    async fn insert_many(&self, tracks: &[Track], skip_conflicts: bool) -> Result<u64> {
        tracks::insert_many(&self.pool, tracks, skip_conflicts).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Track>> {
        tracks::search(&self.pool, term).await
    }

    async fn mark_played(&self, id: &TrackId, at: DateTime<Utc>) -> Result<()> {
        tracks::mark_played(&self.pool, id, at).await
    }
}

//! Catalog server
//!
//! Owns the in-memory catalog and the rotation built on top of it. Every
//! catalog mutation goes through here so the persisted store and the
//! in-memory copy stay in step.

use crate::error::{AddTrackError, LookupTrackError};
use crate::types::{StationConfig, TrackRequest};
use airtime_core::{
    AirtimeError, CatalogStore, Downloader, LookupError, PreparedItem, Resolver, Track, TrackId,
};
use airtime_rotation::{Catalog, Rotation, SharedCatalog};
use chrono::Utc;
use std::sync::Arc;

/// Catalog server context
pub struct CatalogServer {
    pub(crate) store: Arc<dyn CatalogStore>,
    pub(crate) resolver: Arc<dyn Resolver>,
    pub(crate) downloader: Arc<dyn Downloader>,
    pub(crate) catalog: SharedCatalog,
    rotation: Rotation,
    pub(crate) config: StationConfig,
}

impl CatalogServer {
    /// Load the persisted catalog and build the rotation over it
    pub async fn start(
        store: Arc<dyn CatalogStore>,
        resolver: Arc<dyn Resolver>,
        downloader: Arc<dyn Downloader>,
        config: StationConfig,
    ) -> Result<Self, AirtimeError> {
        let tracks = store.load_all().await?;
        let catalog = SharedCatalog::new(Catalog::from_tracks(tracks));
        let rotation = Rotation::new(catalog.clone(), Arc::clone(&resolver), config.recency_policy);

        tracing::info!(
            "Catalog server started with {} tracks (policy {:?})",
            catalog.read().len(),
            config.recency_policy
        );

        Ok(Self {
            store,
            resolver,
            downloader,
            catalog,
            rotation,
            config,
        })
    }

    /// Resolve `query` to track metadata, enforcing the duration ceiling
    pub async fn lookup_track(&self, query: &str) -> Result<Track, LookupTrackError> {
        let track = self.resolver.lookup(query).await?;
        self.check_duration(query, &track)?;
        Ok(track)
    }

    /// Add a track to the catalog and play it soon
    ///
    /// The track is downloaded, persisted, inserted into memory and put on
    /// the queue fast path, in that order. If persisting fails the download
    /// is removed again, so a failed add leaves no trace.
    pub async fn add_track(&self, request: TrackRequest) -> Result<Track, AddTrackError> {
        let track = match request {
            TrackRequest::Query(query) => self.lookup_track(&query).await?,
            TrackRequest::Track(track) => {
                self.check_duration(track.id.as_str(), &track)?;
                track
            }
        };

        let known = self.catalog.read().contains(&track.id);
        if known {
            return Err(AddTrackError::AlreadyExists(track.id));
        }

        let source = self.downloader.download(&track).await?;
        tracing::debug!("Downloaded {} to {}", track.id, source);

        match self.store.insert(&track).await {
            Ok(()) => {}
            // Someone else persisted it meanwhile; their row owns the file
            Err(AirtimeError::Duplicate(id)) => return Err(AddTrackError::AlreadyExists(id)),
            Err(e) => {
                if let Err(remove_err) = self.downloader.remove(&track).await {
                    tracing::error!(
                        "Failed to remove download of {} after persist failure: {}",
                        track.id,
                        remove_err
                    );
                }
                return Err(AddTrackError::Storage(e));
            }
        }

        let inserted = self.catalog.write().insert(track.clone());
        if !inserted {
            return Err(AddTrackError::AlreadyExists(track.id));
        }
        self.rotation.enqueue(track.clone());

        tracing::info!("Added track {} ({})", track.id, track.title);
        Ok(track)
    }

    /// Case-insensitive title search, ordered by title
    ///
    /// Falls back to the in-memory catalog when the store cannot be queried.
    pub async fn search_track(&self, term: &str) -> Vec<Track> {
        match self.store.search(term).await {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!("Store search failed, searching in memory: {}", e);
                self.search_in_memory(term)
            }
        }
    }

    /// Next ready-to-play item; see [`Rotation::next_item`]
    pub async fn next_item(
        &self,
        override_track: Option<Track>,
    ) -> Result<Option<PreparedItem>, LookupError> {
        self.rotation.next_item(override_track).await
    }

    /// Record that `id` started playing now
    pub async fn mark_played(&self, id: &TrackId) -> Result<(), AirtimeError> {
        let now = Utc::now();
        let known = self.catalog.write().mark_played(id, now);
        if !known {
            return Err(AirtimeError::not_found("Track", id.as_str()));
        }
        self.store.mark_played(id, now).await
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.read().len()
    }

    /// Every known track, in load/insertion order
    pub fn tracks(&self) -> Vec<Track> {
        self.catalog.read().snapshot()
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub(crate) fn check_duration(&self, query: &str, track: &Track) -> Result<(), LookupTrackError> {
        let max = self.config.max_duration_seconds;
        match track.duration_seconds {
            Some(duration) if duration > max => Err(LookupTrackError::DurationExceeded {
                query: query.to_string(),
                duration,
                max,
            }),
            _ => Ok(()),
        }
    }

    fn search_in_memory(&self, term: &str) -> Vec<Track> {
        let needle = term.to_lowercase();
        let mut found: Vec<Track> = self
            .catalog
            .read()
            .tracks()
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by_key(|t| t.title.to_lowercase());
        found
    }
}

impl std::fmt::Debug for CatalogServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogServer")
            .field("catalog_len", &self.catalog_len())
            .field("rotation", &self.rotation)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airtime_core::{DownloadError, Source};
    use async_trait::async_trait;

    struct EchoResolver;

    #[async_trait]
    impl Resolver for EchoResolver {
        async fn lookup(&self, query: &str) -> Result<Track, LookupError> {
            Ok(Track::new(query, query.to_uppercase()).with_duration(100))
        }

        async fn resolve_source(&self, track: &Track) -> Result<Source, LookupError> {
            Ok(Source::Stream(track.id.to_string()))
        }
    }

    struct NoopDownloader;

    #[async_trait]
    impl Downloader for NoopDownloader {
        async fn download(&self, track: &Track) -> Result<Source, DownloadError> {
            Ok(Source::File(format!("/tmp/{}.mp3", track.id).into()))
        }

        async fn is_downloaded(&self, _track: &Track) -> bool {
            false
        }

        async fn remove(&self, _track: &Track) -> Result<(), DownloadError> {
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl CatalogStore for FailingStore {
        async fn load_all(&self) -> airtime_core::Result<Vec<Track>> {
            Ok(vec![Track::new("b", "beta"), Track::new("a", "Alpha"), Track::new("c", "Gamma")])
        }
        async fn contains(&self, _id: &TrackId) -> airtime_core::Result<bool> {
            Err(AirtimeError::storage("offline"))
        }
        async fn insert(&self, _track: &Track) -> airtime_core::Result<()> {
            Err(AirtimeError::storage("offline"))
        }
        async fn insert_many(&self, _tracks: &[Track], _skip: bool) -> airtime_core::Result<u64> {
            Err(AirtimeError::storage("offline"))
        }
        async fn search(&self, _term: &str) -> airtime_core::Result<Vec<Track>> {
            Err(AirtimeError::storage("offline"))
        }
        async fn mark_played(&self, _id: &TrackId, _at: chrono::DateTime<Utc>) -> airtime_core::Result<()> {
            Err(AirtimeError::storage("offline"))
        }
    }

    async fn server(config: StationConfig) -> CatalogServer {
        CatalogServer::start(
            Arc::new(FailingStore),
            Arc::new(EchoResolver),
            Arc::new(NoopDownloader),
            config,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn lookup_enforces_duration_ceiling() {
        let config = StationConfig {
            max_duration_seconds: 60,
            ..StationConfig::default()
        };
        let server = server(config).await;

        let err = server.lookup_track("long").await.unwrap_err();
        assert_eq!(
            err,
            LookupTrackError::DurationExceeded {
                query: "long".to_string(),
                duration: 100,
                max: 60
            }
        );
    }

    #[tokio::test]
    async fn lookup_allows_exact_ceiling() {
        let config = StationConfig {
            max_duration_seconds: 100,
            ..StationConfig::default()
        };
        let server = server(config).await;
        assert!(server.lookup_track("edge").await.is_ok());
    }

    #[tokio::test]
    async fn search_falls_back_to_memory() {
        let server = server(StationConfig::default()).await;

        let found = server.search_track("A").await;
        let titles: Vec<&str> = found.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "beta", "Gamma"]);

        assert_eq!(server.search_track("GAM").await.len(), 1);
    }

    #[tokio::test]
    async fn mark_played_unknown_track_is_not_found() {
        let server = server(StationConfig::default()).await;
        let err = server.mark_played(&TrackId::new("zzz")).await.unwrap_err();
        assert!(matches!(err, AirtimeError::NotFound { .. }));
    }
}

//! In-memory catalog
//!
//! Authoritative cache of the persisted catalog for the lifetime of the
//! process. The catalog server is its only writer; the rotation queue reads
//! snapshots from it when reshuffling.

use airtime_core::{Track, TrackId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Insertion-ordered set of tracks keyed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
    index: HashMap<TrackId, usize>,
}

impl Catalog {
    /// Create empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from loaded tracks
    ///
    /// Later duplicates of an id are ignored.
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut catalog = Self::new();
        for track in tracks {
            let id = track.id.clone();
            if !catalog.insert(track) {
                tracing::warn!("Ignoring duplicated track id {}", id);
            }
        }
        catalog
    }

    /// Insert a track unless its id is already known
    ///
    /// Returns `true` if the track was added.
    pub fn insert(&mut self, track: Track) -> bool {
        if self.index.contains_key(&track.id) {
            return false;
        }
        self.index.insert(track.id.clone(), self.tracks.len());
        self.tracks.push(track);
        true
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.index.get(id).map(|&i| &self.tracks[i])
    }

    /// Record a play of `id` at `at`
    ///
    /// Returns `false` if the id is unknown. The timestamp never moves
    /// backwards.
    pub fn mark_played(&mut self, id: &TrackId, at: DateTime<Utc>) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.tracks[i].mark_played(at);
                true
            }
            None => false,
        }
    }

    /// All tracks in insertion order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Owned copy of every track, for shuffling outside the lock
    pub fn snapshot(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Catalog shared between the catalog server and the rotation queue
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog(Arc<RwLock<Catalog>>);

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self(Arc::new(RwLock::new(catalog)))
    }

    /// Read access
    ///
    /// A panic while holding the lock cannot leave the catalog half-written
    /// (every mutation is a single push or field store), so poisoning is
    /// ignored.
    pub fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access
    pub fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Catalog> for SharedCatalog {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn insert_if_absent() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(Track::new("a", "First")));
        assert!(!catalog.insert(Track::new("a", "Second")));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(&TrackId::new("a")).unwrap().title, "First");
    }

    #[test]
    fn from_tracks_drops_duplicates() {
        let catalog = Catalog::from_tracks(vec![
            Track::new("a", "A"),
            Track::new("b", "B"),
            Track::new("a", "A again"),
        ]);

        assert_eq!(catalog.len(), 2);
        let ids: Vec<&str> = catalog.tracks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn mark_played_updates_only_known_tracks() {
        let now = Utc::now();
        let mut catalog = Catalog::from_tracks(vec![Track::new("a", "A")]);

        assert!(catalog.mark_played(&TrackId::new("a"), now));
        assert!(!catalog.mark_played(&TrackId::new("zzz"), now));

        // Older timestamp does not rewind the play
        catalog.mark_played(&TrackId::new("a"), now - Duration::hours(1));
        assert_eq!(catalog.get(&TrackId::new("a")).unwrap().last_played_at, Some(now));
    }

    #[test]
    fn shared_catalog_sees_writes() {
        let shared = SharedCatalog::new(Catalog::new());
        let reader = shared.clone();

        shared.write().insert(Track::new("a", "A"));
        assert!(reader.read().contains(&TrackId::new("a")));
    }
}

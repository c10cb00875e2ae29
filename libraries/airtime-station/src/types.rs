//! Common types for the catalog server and bulk import

use crate::error::ImportError;
use airtime_core::Track;
use airtime_rotation::RecencyPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest track accepted by default, in seconds
pub const DEFAULT_MAX_DURATION_SECONDS: u32 = 720;

/// Catalog server configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Tracks longer than this are rejected by lookup and add
    pub max_duration_seconds: u32,

    /// How never-played tracks are weighted when reshuffling
    pub recency_policy: RecencyPolicy,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            max_duration_seconds: DEFAULT_MAX_DURATION_SECONDS,
            recency_policy: RecencyPolicy::default(),
        }
    }
}

/// What `add_track` should add
#[derive(Debug, Clone, PartialEq)]
pub enum TrackRequest {
    /// Free text or URL, resolved through the resolver
    Query(String),

    /// Already resolved track
    Track(Track),
}

impl From<Track> for TrackRequest {
    fn from(track: Track) -> Self {
        Self::Track(track)
    }
}

impl From<&str> for TrackRequest {
    fn from(query: &str) -> Self {
        Self::Query(query.to_string())
    }
}

/// One record of a playlist file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl PlaylistEntry {
    pub fn to_track(&self) -> Track {
        let mut track = Track::new(self.id.trim(), self.title.clone()).with_url(self.url.clone());
        track.duration_seconds = self.duration;
        track.thumbnail_url.clone_from(&self.thumbnail);
        track
    }

    /// Query handed to the resolver: the URL when present, else the id
    pub fn query(&self) -> &str {
        if self.url.is_empty() {
            &self.id
        } else {
            &self.url
        }
    }
}

/// Progress update during import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    /// Entries to process after dedup
    pub total: usize,

    /// Entries processed so far
    pub processed: usize,

    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,

    /// Query of the entry being processed
    pub current: Option<String>,
}

impl ImportProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }
}

/// A playlist entry that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Original URL (or id) from the playlist
    pub query: String,
    pub reason: String,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Tracks newly added to the catalog
    pub imported: usize,

    /// Entries already in the catalog, repeated, or without an id
    pub skipped: usize,

    pub failed: Vec<ImportFailure>,
}

impl ImportReport {
    /// Write the failure list as JSON so it can be retried later
    pub async fn write_failures(&self, path: &Path) -> Result<(), ImportError> {
        let json = serde_json::to_vec_pretty(&self.failed)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: StationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StationConfig::default());
        assert_eq!(config.max_duration_seconds, 720);
    }

    #[test]
    fn playlist_entry_optional_fields() {
        let entry: PlaylistEntry = serde_json::from_str(
            r#"{"id": " abc ", "url": "https://host.test/watch?v=abc", "title": "Song"}"#,
        )
        .unwrap();

        let track = entry.to_track();
        assert_eq!(track.id.as_str(), "abc");
        assert_eq!(track.duration_seconds, None);
        assert_eq!(entry.query(), "https://host.test/watch?v=abc");
    }

    #[test]
    fn query_falls_back_to_id() {
        let entry = PlaylistEntry {
            id: "abc".to_string(),
            url: String::new(),
            title: "Song".to_string(),
            duration: Some(100),
            thumbnail: None,
        };
        assert_eq!(entry.query(), "abc");
    }

    #[tokio::test]
    async fn failures_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.json");
        let report = ImportReport {
            imported: 1,
            skipped: 0,
            failed: vec![ImportFailure {
                query: "https://host.test/gone".to_string(),
                reason: "Video unavailable".to_string(),
            }],
        };

        report.write_failures(&path).await.unwrap();

        let written: Vec<ImportFailure> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, report.failed);
    }
}

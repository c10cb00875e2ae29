/// Track domain type
use crate::types::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A catalog entry: one piece of playable audio plus its recency metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Canonical URL of the track on its host
    pub url: String,

    /// Thumbnail image URL
    pub thumbnail_url: Option<String>,

    /// Duration in whole seconds (`None` when unknown)
    pub duration_seconds: Option<u32>,

    /// When the track last started playing
    pub last_played_at: Option<DateTime<Utc>>,
}

impl Track {
    /// Create a track with minimal metadata
    ///
    /// The canonical URL is left empty; resolvers fill it in with
    /// [`Track::with_url`].
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            thumbnail_url: None,
            duration_seconds: None,
            last_played_at: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(thumbnail_url.into());
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_last_played_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_played_at = Some(at);
        self
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Option<Duration> {
        self.duration_seconds.map(|s| Duration::from_secs(u64::from(s)))
    }

    /// Whether the track has ever been played
    pub fn has_played(&self) -> bool {
        self.last_played_at.is_some()
    }

    /// Same entity as `other` (dedup compares ids only)
    pub fn same_track(&self, other: &Track) -> bool {
        self.id == other.id
    }

    /// Record a play at `at`
    ///
    /// `last_played_at` never moves backwards; returns `false` when `at` is
    /// older than the recorded play.
    pub fn mark_played(&mut self, at: DateTime<Utc>) -> bool {
        match self.last_played_at {
            Some(previous) if previous > at => false,
            _ => {
                self.last_played_at = Some(at);
                true
            }
        }
    }
}

/// Playable source locators
use crate::types::Track;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque locator that makes a track playable
///
/// Resolvers hand these out; the scheduler never inspects them beyond
/// passing them to the playback driver. A stream URL may expire, in which
/// case the next resolution simply fails with a fresh lookup error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum Source {
    /// Remote streaming URL
    Stream(String),

    /// Locally materialized audio file
    File(PathBuf),
}

impl Source {
    /// Locator as a single string, suitable for a player command line
    pub fn locator(&self) -> String {
        match self {
            Source::Stream(url) => url.clone(),
            Source::File(path) => path.display().to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Source::File(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.locator())
    }
}

/// A track paired with a source resolved for it, ready to hand to a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedItem {
    pub track: Track,
    pub source: Source,
}

impl PreparedItem {
    pub fn new(track: Track, source: Source) -> Self {
        Self { track, source }
    }
}

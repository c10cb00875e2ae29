/// Capability traits consumed by the scheduler
use crate::error::{DownloadError, LookupError};
use crate::types::{Source, Track};
use async_trait::async_trait;

/// Metadata lookup and source resolution
///
/// Implementers talk to whatever hosts the audio (a video site, a local
/// library, a test stub). Calls may suspend on the network; they are the only
/// suspension points the scheduler expects.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Look up a track by free-text query or URL
    ///
    /// # Errors
    /// Returns `LookupError` when nothing matches or extraction fails
    async fn lookup(&self, query: &str) -> Result<Track, LookupError>;

    /// Resolve a playable source for a known track
    ///
    /// # Errors
    /// Returns `LookupError` when the source can no longer be located
    async fn resolve_source(&self, track: &Track) -> Result<Source, LookupError>;
}

/// Out-of-band materialization of a track's audio
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download the audio for `track` and return where it landed
    ///
    /// # Errors
    /// Returns `DownloadError` if the audio cannot be materialized
    async fn download(&self, track: &Track) -> Result<Source, DownloadError>;

    /// Whether the audio for `track` already exists locally
    async fn is_downloaded(&self, track: &Track) -> bool;

    /// Remove previously downloaded audio (used to roll back a failed add)
    ///
    /// Removing audio that does not exist is not an error.
    async fn remove(&self, track: &Track) -> Result<(), DownloadError>;
}

//! Bulk import of playlist files
//!
//! Batch variant of `add_track`: every entry not yet downloaded is resolved
//! by URL and downloaded, then all successes are persisted in one
//! skip-on-conflict write. Per-entry failures are collected in the report
//! instead of aborting the batch.

use crate::error::ImportError;
use crate::server::CatalogServer;
use crate::types::{ImportFailure, ImportProgress, ImportReport, PlaylistEntry};
use airtime_core::{Track, TrackId};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Bulk import orchestrator
pub struct BulkImporter {
    server: Arc<CatalogServer>,
}

impl BulkImporter {
    pub fn new(server: Arc<CatalogServer>) -> Self {
        Self { server }
    }

    /// Import every entry of a JSON playlist file
    ///
    /// Returns a channel for receiving progress updates and a handle to the
    /// import task.
    pub async fn import_file(
        &self,
        path: &Path,
    ) -> Result<
        (
            mpsc::Receiver<ImportProgress>,
            JoinHandle<Result<ImportReport, ImportError>>,
        ),
        ImportError,
    > {
        let entries = load_playlist(path).await?;
        Ok(self.import_entries(entries))
    }

    /// Import already parsed entries
    ///
    /// Progress updates are best effort: when the receiver falls behind or is
    /// never read, updates are dropped and the import carries on. The report
    /// returned by the task is the authoritative result.
    pub fn import_entries(
        &self,
        entries: Vec<PlaylistEntry>,
    ) -> (
        mpsc::Receiver<ImportProgress>,
        JoinHandle<Result<ImportReport, ImportError>>,
    ) {
        let (tx, rx) = mpsc::channel(100);
        let server = Arc::clone(&self.server);

        let handle = tokio::spawn(async move { Self::import_impl(&server, entries, tx).await });

        (rx, handle)
    }

    async fn import_impl(
        server: &CatalogServer,
        entries: Vec<PlaylistEntry>,
        progress_tx: mpsc::Sender<ImportProgress>,
    ) -> Result<ImportReport, ImportError> {
        let (entries, skipped) = dedup_entries(entries);

        let mut progress = ImportProgress::new(entries.len());
        progress.skipped = skipped;
        let mut report = ImportReport {
            skipped,
            ..ImportReport::default()
        };

        let mut pending: Vec<Track> = Vec::new();
        let mut fresh_downloads: Vec<Track> = Vec::new();

        report_progress(&progress_tx, &progress);

        for (i, entry) in entries.iter().enumerate() {
            let query = entry.query().to_string();
            tracing::info!("Importing {}/{}: {}", i + 1, progress.total, query);
            progress.current = Some(query.clone());
            report_progress(&progress_tx, &progress);

            let track = entry.to_track();
            let known = server.catalog.read().contains(&track.id);
            if known {
                tracing::debug!("Skipping {}, already in catalog", track.id);
                report.skipped += 1;
                progress.skipped += 1;
            } else {
                match Self::materialize(server, entry, track).await {
                    Ok((track, downloaded_now)) => {
                        if downloaded_now {
                            fresh_downloads.push(track.clone());
                        }
                        pending.push(track);
                        progress.imported += 1;
                    }
                    Err(reason) => {
                        tracing::warn!("Failed to import {}: {}", query, reason);
                        report.failed.push(ImportFailure { query, reason });
                        progress.failed += 1;
                    }
                }
            }

            progress.processed += 1;
            report_progress(&progress_tx, &progress);
        }

        if let Err(e) = server.store.insert_many(&pending, true).await {
            for track in &fresh_downloads {
                if let Err(remove_err) = server.downloader.remove(track).await {
                    tracing::error!(
                        "Failed to remove download of {} after persist failure: {}",
                        track.id,
                        remove_err
                    );
                }
            }
            return Err(ImportError::Storage(e));
        }

        let mut catalog = server.catalog.write();
        for track in pending {
            if catalog.insert(track) {
                report.imported += 1;
            } else {
                report.skipped += 1;
            }
        }
        drop(catalog);

        tracing::info!(
            "Import finished: {} imported, {} skipped, {} failed",
            report.imported,
            report.skipped,
            report.failed.len()
        );
        Ok(report)
    }

    /// Make the audio for `entry` available locally
    ///
    /// Returns the track to persist and whether it was downloaded just now.
    async fn materialize(
        server: &CatalogServer,
        entry: &PlaylistEntry,
        track: Track,
    ) -> Result<(Track, bool), String> {
        if server.downloader.is_downloaded(&track).await {
            return Ok((track, false));
        }

        let query = entry.query();
        let resolved = server.resolver.lookup(query).await.map_err(|e| e.reason)?;
        server
            .check_duration(query, &resolved)
            .map_err(|e| e.to_string())?;

        if resolved.id != track.id {
            tracing::warn!("{} resolved to a different id: {}", track.id, resolved.id);
        }

        server
            .downloader
            .download(&resolved)
            .await
            .map_err(|e| e.reason)?;
        Ok((resolved, true))
    }
}

fn report_progress(tx: &mpsc::Sender<ImportProgress>, progress: &ImportProgress) {
    if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(progress.clone()) {
        tracing::trace!("Progress receiver is behind, dropping update");
    }
}

/// Parse a JSON playlist file (an array of entries)
pub async fn load_playlist(path: &Path) -> Result<Vec<PlaylistEntry>, ImportError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Drop blank and repeated ids, keeping the first occurrence
///
/// Returns the remaining entries and how many were dropped.
fn dedup_entries(entries: Vec<PlaylistEntry>) -> (Vec<PlaylistEntry>, usize) {
    let total = entries.len();
    let mut seen: HashSet<TrackId> = HashSet::new();

    let kept: Vec<PlaylistEntry> = entries
        .into_iter()
        .filter(|entry| {
            let id = TrackId::new(entry.id.trim());
            !id.is_blank() && seen.insert(id)
        })
        .collect();

    let dropped = total - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> PlaylistEntry {
        PlaylistEntry {
            id: id.to_string(),
            url: format!("https://host.test/{id}"),
            title: id.to_string(),
            duration: None,
            thumbnail: None,
        }
    }

    #[test]
    fn dedup_keeps_first_and_drops_blank() {
        let (kept, dropped) = dedup_entries(vec![
            entry("a"),
            entry(""),
            entry("b"),
            entry("a"),
            entry("   "),
        ]);

        let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(dropped, 3);
    }

    #[tokio::test]
    async fn load_playlist_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playlist.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        assert!(matches!(load_playlist(&path).await, Err(ImportError::Parse(_))));
    }

    #[tokio::test]
    async fn load_playlist_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_playlist(&dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(ImportError::Io(_))));
    }
}

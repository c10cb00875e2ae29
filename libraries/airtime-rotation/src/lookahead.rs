//! Lookahead pipeline
//!
//! Wraps the rotation queue with two single-slot caches:
//!
//! - `current`: the item most recently handed to the playback driver
//! - `next`: the following item, resolved by a background task
//!
//! Each `next_item` call promotes `next` to `current` when a prefetch
//! succeeded, then spawns a new prefetch. Resolver latency is therefore paid
//! while the previous item is playing instead of between items.
//!
//! A prefetch that is still running never holds up the caller: the head of
//! the queue is resolved in the foreground instead, and the running prefetch
//! fills `next` for the call after that.

use crate::catalog::SharedCatalog;
use crate::queue::RotationQueue;
use crate::types::RecencyPolicy;
use airtime_core::{LookupError, PreparedItem, Resolver, Track, TrackId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// Rotation queue plus background prefetch of the next item
pub struct Rotation {
    queue: Arc<Mutex<RotationQueue>>,
    resolver: Arc<dyn Resolver>,
    current: Mutex<Option<PreparedItem>>,
    next: Arc<Mutex<Option<PreparedItem>>>,

    /// In-flight prefetch; also serializes `next_item` calls
    prefetch: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Rotation {
    pub fn new(catalog: SharedCatalog, resolver: Arc<dyn Resolver>, policy: RecencyPolicy) -> Self {
        Self {
            queue: Arc::new(Mutex::new(RotationQueue::new(catalog, policy))),
            resolver,
            current: Mutex::new(None),
            next: Arc::new(Mutex::new(None)),
            prefetch: tokio::sync::Mutex::new(None),
        }
    }

    /// Produce the next ready-to-play item
    ///
    /// With `override_track`, that track is resolved and becomes `current`
    /// directly: the queue is not consumed and no prefetch is started.
    ///
    /// Otherwise a prefetched item is promoted if one is ready, or the queue
    /// head is resolved in the foreground. An in-flight prefetch is left
    /// running and never awaited; a new one is spawned only when none is
    /// running.
    ///
    /// Returns `Ok(None)` when the catalog is empty.
    ///
    /// # Errors
    /// Returns `LookupError` if a foreground resolution fails. Prefetch
    /// failures are never returned; they are logged and skipped.
    pub async fn next_item(
        &self,
        override_track: Option<Track>,
    ) -> Result<Option<PreparedItem>, LookupError> {
        let mut prefetch = self.prefetch.lock().await;

        if let Some(track) = override_track {
            tracing::debug!("Playing override {}", track.id);
            let source = self.resolver.resolve_source(&track).await?;
            let item = PreparedItem::new(track, source);
            *lock(&self.current) = Some(item.clone());
            return Ok(Some(item));
        }

        // Checked before taking `next`: a finished prefetch has already stored
        // its result, so spawning a replacement cannot overwrite an item
        let in_flight = prefetch.as_ref().is_some_and(|handle| !handle.is_finished());

        let promoted = lock(&self.next).take();
        let refill = promoted.is_some() || !in_flight;
        let item = match promoted {
            Some(item) => {
                tracing::debug!("Promoting prefetched {}", item.track.id);
                item
            }
            None => {
                if in_flight {
                    tracing::debug!("Prefetch still running, resolving in the foreground");
                }
                match self.resolve_cold().await? {
                    Some(item) => item,
                    None => {
                        tracing::info!("Catalog is empty, nothing to play");
                        return Ok(None);
                    }
                }
            }
        };

        *lock(&self.current) = Some(item.clone());

        if refill {
            if let Some(handle) = prefetch.take() {
                if let Err(e) = handle.await {
                    tracing::warn!("Prefetch task ended abnormally: {}", e);
                }
            }
            *prefetch = Some(self.spawn_prefetch());
        }

        Ok(Some(item))
    }

    /// Wait until any in-flight prefetch has stored its result
    pub async fn wait_for_prefetch(&self) {
        let handle = self.prefetch.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!("Prefetch task ended abnormally: {}", e);
            }
        }
    }

    /// Item most recently returned by `next_item`
    pub fn current(&self) -> Option<PreparedItem> {
        lock(&self.current).clone()
    }

    /// Prefetched item, if one is ready
    pub fn peek_next(&self) -> Option<PreparedItem> {
        lock(&self.next).clone()
    }

    /// Fast-path a track to the front of the queue
    ///
    /// An item that was already prefetched still plays first.
    pub fn enqueue(&self, track: Track) {
        lock(&self.queue).enqueue(track);
    }

    pub fn queue_len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn upcoming(&self) -> Vec<TrackId> {
        lock(&self.queue).upcoming()
    }

    /// Start a new rotation epoch immediately
    pub fn reshuffle(&self) -> usize {
        lock(&self.queue).reshuffle()
    }

    pub fn epoch(&self) -> u64 {
        lock(&self.queue).epoch()
    }

    /// Dequeue and resolve in the foreground, propagating resolver errors
    async fn resolve_cold(&self) -> Result<Option<PreparedItem>, LookupError> {
        let dequeued = lock(&self.queue).dequeue();
        let Some(track) = dequeued else {
            return Ok(None);
        };

        let source = self.resolver.resolve_source(&track).await?;
        Ok(Some(PreparedItem::new(track, source)))
    }

    fn spawn_prefetch(&self) -> JoinHandle<()> {
        let queue = Arc::clone(&self.queue);
        let resolver = Arc::clone(&self.resolver);
        let next = Arc::clone(&self.next);

        tokio::spawn(async move {
            let item = prefetch_next(&queue, resolver.as_ref()).await;
            if let Some(item) = &item {
                tracing::debug!("Prefetched {}", item.track.id);
            }
            *lock(&next) = item;
        })
    }
}

/// Dequeue until a track resolves
///
/// Gives up after one catalog's worth of consecutive failures, or as soon
/// as the queue has nothing to offer.
async fn prefetch_next(
    queue: &Mutex<RotationQueue>,
    resolver: &dyn Resolver,
) -> Option<PreparedItem> {
    let attempts = lock(queue).catalog_len().max(1);

    for _ in 0..attempts {
        let dequeued = lock(queue).dequeue();
        let track = dequeued?;

        match resolver.resolve_source(&track).await {
            Ok(source) => return Some(PreparedItem::new(track, source)),
            Err(e) => tracing::warn!("Skipping {} during prefetch: {}", track.id, e),
        }
    }

    tracing::warn!("Prefetch gave up after {} consecutive failures", attempts);
    None
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rotation")
            .field("queue_len", &self.queue_len())
            .field("current", &self.current().map(|item| item.track.id))
            .field("next", &self.peek_next().map(|item| item.track.id))
            .finish_non_exhaustive()
    }
}

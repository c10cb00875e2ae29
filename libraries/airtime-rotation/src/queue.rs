//! Rotation queue
//!
//! Holds the shuffled order of the current rotation epoch:
//!
//! ```text
//! Fast path (added tracks, newest first):
//!   - Track X
//! ─────────────────────────────
//! Current epoch (weighted shuffle of the catalog):
//!   - Track D
//!   - Track E
//!   - Track F
//! ─────────────────────────────
//! Exhausted → reshuffle the live catalog into a new epoch
//! ```
//!
//! Both tiers live in one sequence: the fast path is simply the front of it.
//! A freshly added track therefore plays before anything the shuffle chose,
//! which is a deliberate exception to fairness weighting that lasts until the
//! next reshuffle.

use crate::catalog::SharedCatalog;
use crate::shuffle::shuffle_pairs;
use crate::types::{QueueState, RecencyPolicy};
use crate::weights::fairness_weights;
use airtime_core::{Track, TrackId};
use chrono::Utc;
use rand::thread_rng;
use std::collections::VecDeque;

/// Shuffled play order over a shared catalog
#[derive(Debug)]
pub struct RotationQueue {
    /// Tracks still to play in this epoch, head first
    order: VecDeque<Track>,

    /// Live catalog that each epoch is shuffled from
    catalog: SharedCatalog,

    /// How never-played tracks are weighted
    policy: RecencyPolicy,

    /// Number of reshuffles so far
    epoch: u64,
}

impl RotationQueue {
    /// Create an empty queue over `catalog`
    pub fn new(catalog: SharedCatalog, policy: RecencyPolicy) -> Self {
        Self {
            order: VecDeque::new(),
            catalog,
            policy,
            epoch: 0,
        }
    }

    pub fn state(&self) -> QueueState {
        if self.order.is_empty() {
            QueueState::Empty
        } else {
            QueueState::Loaded
        }
    }

    /// Fast-path insertion: `track` plays before everything already queued
    pub fn enqueue(&mut self, track: Track) {
        tracing::debug!("Fast-path enqueue of {}", track.id);
        self.order.push_front(track);
    }

    /// Pop the next track to play
    ///
    /// An empty queue is first rebuilt from the catalog. Returns `None` only
    /// when the catalog itself is empty, which callers must treat as "no
    /// content" rather than an error.
    ///
    /// The returned value is refreshed from the catalog, so it carries the
    /// latest persisted fields even if it sat in the queue for a while.
    /// Queued ids the catalog no longer knows are dropped.
    pub fn dequeue(&mut self) -> Option<Track> {
        loop {
            if self.order.is_empty() && self.reshuffle() == 0 {
                return None;
            }

            let queued = self.order.pop_front()?;
            let known = self.catalog.read().get(&queued.id).cloned();
            match known {
                Some(track) => {
                    tracing::debug!(
                        "Dequeued {} ({} left in epoch {})",
                        track.id,
                        self.order.len(),
                        self.epoch
                    );
                    return Some(track);
                }
                None => tracing::debug!("Dropping {}: no longer in the catalog", queued.id),
            }
        }
    }

    /// Replace the current order with a fresh weighted shuffle of the catalog
    ///
    /// Anything still queued, fast-path tracks included, is dropped. Returns
    /// the length of the new order.
    pub fn reshuffle(&mut self) -> usize {
        let snapshot = self.catalog.read().snapshot();

        if snapshot.is_empty() {
            self.order.clear();
            return 0;
        }

        let weights = fairness_weights(&snapshot, Utc::now(), self.policy);
        let shuffled = shuffle_pairs(snapshot.into_iter().zip(weights), &mut thread_rng());

        self.order = shuffled.into();
        self.epoch += 1;

        tracing::info!("Shuffled {} tracks into epoch {}", self.order.len(), self.epoch);
        self.order.len()
    }

    /// Ids still queued, in play order
    pub fn upcoming(&self) -> Vec<TrackId> {
        self.order.iter().map(|t| t.id.clone()).collect()
    }

    /// Number of tracks in the catalog backing this queue
    pub fn catalog_len(&self) -> usize {
        self.catalog.read().len()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn policy(&self) -> RecencyPolicy {
        self.policy
    }

    /// Change the recency policy; takes effect at the next reshuffle
    pub fn set_policy(&mut self, policy: RecencyPolicy) {
        self.policy = policy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::collections::HashSet;

    fn catalog_of(ids: &[&str]) -> SharedCatalog {
        SharedCatalog::new(Catalog::from_tracks(
            ids.iter().map(|id| Track::new(*id, format!("Track {id}"))),
        ))
    }

    #[test]
    fn create_empty_queue() {
        let queue = RotationQueue::new(catalog_of(&["a"]), RecencyPolicy::default());
        assert_eq!(queue.state(), QueueState::Empty);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.epoch(), 0);
    }

    #[test]
    fn empty_catalog_reports_no_content() {
        let mut queue = RotationQueue::new(catalog_of(&[]), RecencyPolicy::default());

        assert!(queue.dequeue().is_none());
        assert_eq!(queue.state(), QueueState::Empty);
        assert_eq!(queue.epoch(), 0);
    }

    #[test]
    fn first_dequeue_loads_an_epoch() {
        let mut queue = RotationQueue::new(catalog_of(&["a", "b", "c"]), RecencyPolicy::default());

        assert!(queue.dequeue().is_some());
        assert_eq!(queue.state(), QueueState::Loaded);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.epoch(), 1);
    }

    #[test]
    fn one_epoch_plays_every_track_once() {
        let ids = ["a", "b", "c", "d", "e"];
        let mut queue = RotationQueue::new(catalog_of(&ids), RecencyPolicy::default());

        let played: Vec<TrackId> = (0..ids.len()).map(|_| queue.dequeue().unwrap().id).collect();
        let unique: HashSet<&TrackId> = played.iter().collect();

        assert_eq!(unique.len(), ids.len());
        assert_eq!(queue.state(), QueueState::Empty);

        // The next dequeue starts a new epoch instead of failing
        assert!(queue.dequeue().is_some());
        assert_eq!(queue.epoch(), 2);
    }

    #[test]
    fn enqueue_goes_to_front_when_loaded() {
        let catalog = catalog_of(&["a", "b", "c"]);
        let mut queue = RotationQueue::new(catalog.clone(), RecencyPolicy::default());
        queue.reshuffle();

        catalog.write().insert(Track::new("new", "Fresh"));
        queue.enqueue(Track::new("new", "Fresh"));

        assert_eq!(queue.upcoming()[0].as_str(), "new");
        assert_eq!(queue.dequeue().unwrap().id.as_str(), "new");
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn enqueue_when_empty_skips_reshuffle() {
        let mut queue = RotationQueue::new(catalog_of(&["a", "b"]), RecencyPolicy::default());
        queue.enqueue(Track::new("a", "Track a"));

        assert_eq!(queue.state(), QueueState::Loaded);
        assert_eq!(queue.dequeue().unwrap().id.as_str(), "a");
        assert_eq!(queue.epoch(), 0);
    }

    #[test]
    fn dequeue_refreshes_from_catalog() {
        let catalog = catalog_of(&["a"]);
        let mut queue = RotationQueue::new(catalog.clone(), RecencyPolicy::default());
        queue.reshuffle();

        let now = Utc::now();
        catalog.write().mark_played(&TrackId::new("a"), now);

        assert_eq!(queue.dequeue().unwrap().last_played_at, Some(now));
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let mut queue = RotationQueue::new(catalog_of(&["a"]), RecencyPolicy::default());
        queue.enqueue(Track::new("ghost", "Not in catalog"));

        assert_eq!(queue.dequeue().unwrap().id.as_str(), "a");
        assert_eq!(queue.epoch(), 1);
    }

    #[test]
    fn unknown_id_ahead_of_loaded_epoch_is_skipped() {
        let mut queue = RotationQueue::new(catalog_of(&["a", "b"]), RecencyPolicy::default());
        queue.reshuffle();
        queue.enqueue(Track::new("ghost", "Not in catalog"));

        let played: HashSet<TrackId> = (0..2).map(|_| queue.dequeue().unwrap().id).collect();

        assert!(!played.contains(&TrackId::new("ghost")));
        assert_eq!(played.len(), 2);
        assert_eq!(queue.epoch(), 1);
    }

    #[test]
    fn reshuffle_sees_grown_catalog() {
        let catalog = catalog_of(&["a"]);
        let mut queue = RotationQueue::new(catalog.clone(), RecencyPolicy::default());
        assert_eq!(queue.reshuffle(), 1);

        catalog.write().insert(Track::new("b", "B"));
        assert_eq!(queue.reshuffle(), 2);
    }
}

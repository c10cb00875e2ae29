//! Airtime - Rotation Scheduling
//!
//! Decides what plays next on a station that loops over a growing catalog.
//!
//! This crate provides:
//! - Fairness weighting (time since last play → weight in `[0.1, 1.0]`)
//! - Weighted shuffle without replacement
//! - In-memory catalog shared with the catalog server
//! - Rotation queue with a fast path for freshly added tracks
//! - Lookahead pipeline that resolves the next item in the background
//!
//! # Architecture
//!
//! `airtime-rotation` has no database or network dependency. Sources are
//! resolved through the [`airtime_core::Resolver`] trait, so the same queue
//! runs against yt-dlp in the daemon and against stubs in tests.
//!
//! # Example
//!
//! ```rust
//! use airtime_core::Track;
//! use airtime_rotation::{Catalog, RecencyPolicy, RotationQueue, SharedCatalog};
//!
//! let catalog = SharedCatalog::new(Catalog::from_tracks(vec![
//!     Track::new("a", "First"),
//!     Track::new("b", "Second"),
//! ]));
//!
//! let mut queue = RotationQueue::new(catalog, RecencyPolicy::default());
//!
//! // First dequeue shuffles the catalog into a new epoch
//! let first = queue.dequeue().unwrap();
//! let second = queue.dequeue().unwrap();
//! assert_ne!(first.id, second.id);
//! ```

mod catalog;
mod error;
mod lookahead;
mod queue;
pub mod shuffle;
pub mod types;
pub mod weights;

pub use catalog::{Catalog, SharedCatalog};
pub use error::{Result, RotationError};
pub use lookahead::Rotation;
pub use queue::RotationQueue;
pub use shuffle::{weighted_shuffle, weighted_shuffle_with};
pub use types::{QueueState, RecencyPolicy};
pub use weights::{fairness_weights, MAX_WEIGHT, MIN_WEIGHT};

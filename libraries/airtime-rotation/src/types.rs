//! Core types for rotation scheduling

use serde::{Deserialize, Serialize};

/// How never-played tracks are aged by the fairness weighter
///
/// Played tracks are aged by the time since their last play. A track that
/// has never played has no such time, so the policy decides where it lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyPolicy {
    /// Never-played tracks have age zero and get the minimum weight.
    ///
    /// This is the historical behavior: brand new tracks are the *least*
    /// likely to be drawn early by a reshuffle (the add fast path still plays
    /// them promptly).
    #[default]
    NeverPlayedIsFresh,

    /// Never-played tracks are aged like the stalest played track and get
    /// the maximum weight, so new content is introduced promptly.
    NeverPlayedIsStalest,
}

/// Rotation queue state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueState {
    /// No shuffled order; the next dequeue rebuilds one from the catalog
    Empty,

    /// A shuffled order is being consumed
    Loaded,
}

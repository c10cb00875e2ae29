//! Fairness weighting
//!
//! Converts "time since last played" into a sampling weight per track. Ages
//! are rescaled linearly into `[MIN_WEIGHT, MAX_WEIGHT]`, so the track that
//! has gone longest without playing always gets `MAX_WEIGHT` and the most
//! recently played one `MIN_WEIGHT`.

use crate::types::RecencyPolicy;
use airtime_core::Track;
use chrono::{DateTime, Utc};

/// Lowest weight handed out (most recently played)
pub const MIN_WEIGHT: f64 = 0.1;

/// Highest weight handed out (longest since played)
pub const MAX_WEIGHT: f64 = 1.0;

/// Compute one weight per track, in catalog order
///
/// Every weight is in `[MIN_WEIGHT, MAX_WEIGHT]`. When all ages are equal
/// (empty or single-track catalogs, nothing played yet) every weight is
/// `MIN_WEIGHT`.
pub fn fairness_weights(tracks: &[Track], now: DateTime<Utc>, policy: RecencyPolicy) -> Vec<f64> {
    rescale(&track_ages(tracks, now, policy))
}

/// Seconds since each track last played
///
/// Plays in the future (clock skew) count as age zero. Never-played tracks
/// are aged according to `policy`.
pub fn track_ages(tracks: &[Track], now: DateTime<Utc>, policy: RecencyPolicy) -> Vec<f64> {
    let played: Vec<Option<f64>> = tracks
        .iter()
        .map(|track| {
            track
                .last_played_at
                .map(|at| ((now - at).num_milliseconds() as f64 / 1000.0).max(0.0))
        })
        .collect();

    let never_played_age = match policy {
        RecencyPolicy::NeverPlayedIsFresh => 0.0,
        RecencyPolicy::NeverPlayedIsStalest => played.iter().flatten().copied().fold(0.0, f64::max),
    };

    played
        .into_iter()
        .map(|age| age.unwrap_or(never_played_age))
        .collect()
}

/// Linearly map ages onto `[MIN_WEIGHT, MAX_WEIGHT]`
pub fn rescale(ages: &[f64]) -> Vec<f64> {
    let min = ages.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !range.is_finite() || range <= 0.0 {
        return vec![MIN_WEIGHT; ages.len()];
    }

    ages.iter()
        .map(|age| ((age - min) / range * (MAX_WEIGHT - MIN_WEIGHT) + MIN_WEIGHT).clamp(MIN_WEIGHT, MAX_WEIGHT))
        .collect()
}

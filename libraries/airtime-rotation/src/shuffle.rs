//! Weighted shuffle
//!
//! Produces a full permutation biased by weight, without replacement. Each
//! item draws `U ~ Uniform(0, 1]` and gets the key `U^(1/w)`; items are then
//! sorted by key, highest first. A larger weight pushes the key towards 1 and
//! so towards the front, while every item keeps a nonzero chance of landing
//! anywhere.
//!
//! Keys are compared as `ln(U) / w`, which orders identically to `U^(1/w)`
//! but does not underflow to zero for tiny weights.

use crate::error::{Result, RotationError};
use rand::{thread_rng, Rng};

/// Substitute for non-positive or non-finite weights
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Shuffle `items` biased by `weights` using the thread-local RNG
///
/// Every call draws fresh randomness, so shuffling the same input twice
/// yields different orders almost surely.
pub fn weighted_shuffle<T>(items: Vec<T>, weights: &[f64]) -> Result<Vec<T>> {
    weighted_shuffle_with(items, weights, &mut thread_rng())
}

/// Shuffle `items` biased by `weights` using the given RNG
pub fn weighted_shuffle_with<T, R>(items: Vec<T>, weights: &[f64], rng: &mut R) -> Result<Vec<T>>
where
    R: Rng + ?Sized,
{
    if items.len() != weights.len() {
        return Err(RotationError::WeightCountMismatch {
            items: items.len(),
            weights: weights.len(),
        });
    }

    Ok(shuffle_pairs(items.into_iter().zip(weights.iter().copied()), rng))
}

/// Shuffle `(item, weight)` pairs; lengths cannot disagree here
pub(crate) fn shuffle_pairs<T, R>(pairs: impl IntoIterator<Item = (T, f64)>, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let mut keyed: Vec<(f64, T)> = pairs
        .into_iter()
        .map(|(item, weight)| (sort_key(sanitize_weight(weight), rng), item))
        .collect();

    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().map(|(_, item)| item).collect()
}

fn sort_key<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> f64 {
    // gen() is in [0, 1); flip it so ln() never sees zero
    let u: f64 = 1.0 - rng.gen::<f64>();
    u.ln() / weight
}

fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        tracing::warn!("Clamping invalid shuffle weight {} to {}", weight, WEIGHT_EPSILON);
        WEIGHT_EPSILON
    }
}

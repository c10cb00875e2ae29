//! Error types for rotation scheduling

use thiserror::Error;

/// Rotation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RotationError {
    /// Items and weights passed to the shuffle differ in length
    #[error("Weight count mismatch: {items} items but {weights} weights")]
    WeightCountMismatch { items: usize, weights: usize },
}

/// Result type for rotation operations
pub type Result<T> = std::result::Result<T, RotationError>;

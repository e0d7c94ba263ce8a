//! Shared error type for the morph pipeline.

use thiserror::Error;

/// Result alias for fallible morph-core operations.
pub type MorphResult<T> = Result<T, MorphError>;

/// Errors surfaced by the morph pipeline.
///
/// Precondition violations (mismatched slice lengths handed to the tree
/// builder, an empty density map with a nonzero request) are caller bugs
/// and stay as assertions rather than variants here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MorphError {
    /// A bounded channel was requested with no usable slots.
    #[error("bounded channel capacity must be at least 1")]
    ZeroCapacity,

    /// A point set did not match the fixed per-run length.
    #[error("point set length {got} does not match expected {expected}")]
    SetLenMismatch { expected: usize, got: usize },

    /// The rejection sampler exhausted its attempt budget early.
    #[error("sampler placed {accepted} of {requested} points before giving up")]
    ShortSample { requested: usize, accepted: usize },
}

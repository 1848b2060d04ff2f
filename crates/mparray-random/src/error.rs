//! Error types for random generation

use thiserror::Error;

/// Result type for random generation
pub type Result<T> = std::result::Result<T, RandomError>;

/// Errors raised while generating random matrix-product objects
#[derive(Error, Debug)]
pub enum RandomError {
    /// A shape or rank specification had the wrong length
    #[error("specification length mismatch for {what}: expected {expected}, got {got}")]
    SpecLength {
        /// The offending specification
        what: &'static str,
        /// Expected number of entries
        expected: usize,
        /// Provided number of entries
        got: usize,
    },

    /// A dimension argument was zero or otherwise unusable
    #[error("invalid dimension for {what}: {value}")]
    BadDimension {
        /// The offending argument
        what: &'static str,
        /// Its value
        value: usize,
    },

    /// Interaction terms cannot be longer than the chain
    #[error("interaction length {intlen} exceeds {sites} sites")]
    InteractionTooLong {
        /// Number of chain sites
        sites: usize,
        /// Requested interaction length
        intlen: usize,
    },

    /// Errors surfaced by the container
    #[error(transparent)]
    Core(#[from] mparray_core::CoreError),
}

//! Error types for matrix-product array operations

use thiserror::Error;

/// Result type for matrix-product array operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while constructing or contracting matrix-product arrays
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bond dimension mismatch between adjacent local tensors
    #[error("bond dimension mismatch at site {site}: right rank {right} vs left rank {left}")]
    BondMismatch {
        /// Site on the left side of the offending bond
        site: usize,
        /// Right bond dimension of the tensor at `site`
        right: usize,
        /// Left bond dimension of the tensor at `site + 1`
        left: usize,
    },

    /// Boundary tensors must carry bond dimension 1
    #[error("boundary rank must be 1, got {rank} at the {side} end")]
    BadBoundary {
        /// "left" or "right"
        side: &'static str,
        /// The offending bond dimension
        rank: usize,
    },

    /// A sequence argument had the wrong length
    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        /// What was being measured
        what: &'static str,
        /// The expected length
        expected: usize,
        /// The actual length provided
        got: usize,
    },

    /// A local tensor had an unexpected number of physical legs
    #[error("site {site} has {got} physical legs, expected {expected}")]
    LegCountMismatch {
        /// The offending site
        site: usize,
        /// The expected leg count
        expected: usize,
        /// The actual leg count
        got: usize,
    },

    /// Chains must contain at least one site
    #[error("matrix-product array must have at least one site")]
    Empty,

    /// Invalid operation with a free-form description
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of the invalid operation
        message: String,
    },
}

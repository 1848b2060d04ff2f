//! Error types for POVM construction and evaluation

use thiserror::Error;

/// Result type for POVM operations
pub type Result<T> = std::result::Result<T, PovmError>;

/// Errors raised by POVM construction and expectation evaluation
#[derive(Error, Debug)]
pub enum PovmError {
    /// A configuration that is meaningful but not implemented
    ///
    /// Distinct from misuse so callers can detect missing features.
    #[error("not supported: {message}")]
    NotSupported {
        /// What is missing
        message: String,
    },

    /// The host object's physical legs were not understood
    #[error("data shape not understood: {message}")]
    DataShape {
        /// What was found
        message: String,
    },

    /// The host chain is shorter than the measurement device
    #[error("host has {host} sites but the device needs at least {width}")]
    HostTooShort {
        /// Host site count
        host: usize,
        /// Device site count
        width: usize,
    },

    /// The POVM elements are inconsistent
    #[error("invalid POVM: {message}")]
    InvalidPovm {
        /// What is wrong
        message: String,
    },

    /// Errors surfaced by the container
    #[error(transparent)]
    Core(#[from] mparray_core::CoreError),
}

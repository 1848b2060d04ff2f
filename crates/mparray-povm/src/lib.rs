#![warn(missing_docs)]
//! Multipartite POVMs and measurement statistics in matrix-product form
//!
//! A POVM over several sites is stored as a chain with three physical legs
//! per site `(outcome, row, column)`. This crate provides:
//! - `LocalPovm`: single-site measurements (computational basis and the
//!   qubit Pauli bases)
//! - `MPPovm`: the multipartite device, built e.g. as a product of local
//!   POVMs, with iteration over joint-outcome operators
//! - `MPPovm::expectations`: lazy sliding-window outcome probabilities
//!   against a mixed-state host
//!
//! # Example
//!
//! ```
//! use mparray_povm::{LocalPovm, MPPovm};
//! use mparray_random::random_mpdo;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let rho = random_mpdo(&mut rng, 4, 2, 3).unwrap();
//!
//! let device = MPPovm::from_local_povm(&LocalPovm::z_povm(2).unwrap(), 2).unwrap();
//! let windows: Vec<_> = device
//!     .expectations(&rho)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(windows.len(), 3);
//! ```

pub mod error;
pub mod localpovm;
pub mod mppovm;

// Re-export main types
pub use error::{PovmError, Result};
pub use localpovm::LocalPovm;
pub use mppovm::{Expectations, MPPovm};

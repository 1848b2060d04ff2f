#![warn(missing_docs)]
//! Random matrix-product states, operators and density operators
//!
//! This crate composes Gaussian primitives, a Haar-distributed unitary
//! sampler and a rank-constrained chain generator into factories for
//! physical objects:
//! - `random_mps`: normalized pure states
//! - `random_mpo`: operators with optional local Hermitization
//! - `random_mpdo`: positive semidefinite, trace-1 density operators with a
//!   scrambled gauge
//! - `random_local_ham`: sums of sliding local interaction terms
//!
//! Every factory takes an explicit random generator; `_default` variants use
//! the thread-local one, which makes repeated calls order-dependent.
//!
//! # Example
//!
//! ```
//! use mparray_random::random_mps;
//! use mparray_core::MPArray;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mps = random_mps(&mut rng, 4, 2, 10, true).unwrap();
//! assert_eq!(mps.ranks(), vec![10, 10, 10]);
//!
//! let ip = MPArray::inner(&mps, &mps).unwrap();
//! assert!((ip - 1.0).norm() < 1e-10);
//! ```

pub mod error;
pub mod factory;
pub mod gaussian;
pub mod generate;
pub mod haar;

// Re-export main entry points
pub use error::{RandomError, Result};
pub use factory::{
    diagonal_mpa, eye, eye_per_site, random_local_ham, random_local_ham_default, random_mpa,
    random_mpa_default, random_mpdo, random_mpdo_default, random_mpo, random_mpo_default,
    random_mps, random_mps_default, zero,
};
pub use gaussian::{random_density_matrix, random_matrix, random_op, random_tensor, random_vec, Gaussian};
pub use generate::{generate, LdimSpec, RankSpec};
pub use haar::{haar_unitary, haar_unitary_default};

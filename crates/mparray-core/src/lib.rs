#![warn(missing_docs)]
//! Matrix-product array (tensor train) container
//!
//! This crate provides the chain container consumed by the factories and the
//! measurement engine:
//! - `MPArray`: a chain of local tensors with matching bond dimensions and
//!   any number of physical legs per site
//! - Construction from raw tensors, Kronecker factors or one dense array
//! - Norm, trace, inner product, sums and site-wise contraction
//! - `reductions_mpo`: lazy reduced operators on sliding windows
//!
//! # Example
//!
//! ```
//! use mparray_core::{local_from_data, MPArray};
//!
//! // A two-site product chain
//! let t0 = local_from_data(vec![1.0, 2.0], &[1, 2, 1]);
//! let t1 = local_from_data(vec![3.0, 4.0], &[1, 2, 1]);
//! let mpa = MPArray::new(vec![t0, t1]).unwrap();
//!
//! assert_eq!(mpa.ranks(), vec![1]);
//! assert!((mpa.sum() - 21.0).abs() < 1e-12);
//! ```

pub mod arithmetic;
pub mod error;
pub mod linalg;
pub mod mparray;
pub mod reductions;
pub mod types;
pub mod utils;

// Re-export main types
pub use error::{CoreError, Result};
pub use mparray::{full_rank, MPArray, PaxisIter};
pub use reductions::{mps_to_mpo, reductions_mpo, Reductions};
pub use types::{local_from_data, local_zeros, strides_of, LocalTensor, LocalTensorOps, Scalar};
pub use utils::{global_to_local, local_to_global};

//! Single-site POVMs
//!
//! A local POVM is a set of positive semidefinite operators on one site that
//! sum to the identity. The qubit constructors below use the closed-form
//! Pauli eigenprojectors.

use mdarray::DTensor;
use mparray_core::{local_from_data, LocalTensor};
use num_complex::Complex64;

use crate::error::{PovmError, Result};

/// Outcome-indexed measurement elements on a single site
#[derive(Debug, Clone)]
pub struct LocalPovm {
    elements: Vec<DTensor<Complex64, 2>>,
    dim: usize,
}

impl LocalPovm {
    /// Create a local POVM from its elements
    ///
    /// All elements must be square with equal dimension and sum to the
    /// identity within `1e-10`.
    pub fn new(elements: Vec<DTensor<Complex64, 2>>) -> Result<Self> {
        let first = elements.first().ok_or_else(|| PovmError::InvalidPovm {
            message: "no elements".to_string(),
        })?;
        let dim = first.dim(0);
        for e in &elements {
            if e.dim(0) != dim || e.dim(1) != dim {
                return Err(PovmError::InvalidPovm {
                    message: format!(
                        "element shape ({}, {}) differs from dimension {}",
                        e.dim(0),
                        e.dim(1),
                        dim
                    ),
                });
            }
        }

        for i in 0..dim {
            for j in 0..dim {
                let mut acc = Complex64::new(0.0, 0.0);
                for e in &elements {
                    acc += e[[i, j]];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                if (acc - expected).norm() > 1e-10 {
                    return Err(PovmError::InvalidPovm {
                        message: format!("elements do not sum to the identity at ({}, {})", i, j),
                    });
                }
            }
        }

        Ok(Self { elements, dim })
    }

    /// Number of outcomes
    pub fn outcomes(&self) -> usize {
        self.elements.len()
    }

    /// Local Hilbert-space dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The measurement elements
    pub fn elements(&self) -> &[DTensor<Complex64, 2>] {
        &self.elements
    }

    /// Stack the elements into one `(outcomes, dim, dim)` block
    pub fn outcome_tensor(&self) -> LocalTensor<Complex64> {
        let n = self.outcomes();
        let d = self.dim;
        let mut data = Vec::with_capacity(n * d * d);
        for e in &self.elements {
            for i in 0..d {
                for j in 0..d {
                    data.push(e[[i, j]]);
                }
            }
        }
        local_from_data(data, &[n, d, d])
    }

    /// Projective measurement in the computational basis
    pub fn z_povm(dim: usize) -> Result<Self> {
        let elements = (0..dim)
            .map(|k| {
                DTensor::<Complex64, 2>::from_fn([dim, dim], |idx| {
                    if idx[0] == k && idx[1] == k {
                        Complex64::new(1.0, 0.0)
                    } else {
                        Complex64::new(0.0, 0.0)
                    }
                })
            })
            .collect();
        Self::new(elements)
    }

    /// Qubit measurement in the Pauli-X eigenbasis
    pub fn x_povm() -> Result<Self> {
        // |+-> = (|0> +- |1>) / sqrt(2)
        let h = 0.5;
        let elements = [1.0, -1.0]
            .iter()
            .map(|&s| {
                DTensor::<Complex64, 2>::from_fn([2, 2], |idx| {
                    if idx[0] == idx[1] {
                        Complex64::new(h, 0.0)
                    } else {
                        Complex64::new(s * h, 0.0)
                    }
                })
            })
            .collect();
        Self::new(elements)
    }

    /// Qubit measurement in the Pauli-Y eigenbasis
    pub fn y_povm() -> Result<Self> {
        // |+-i> = (|0> +- i |1>) / sqrt(2)
        let h = 0.5;
        let elements = [1.0, -1.0]
            .iter()
            .map(|&s| {
                DTensor::<Complex64, 2>::from_fn([2, 2], |idx| match (idx[0], idx[1]) {
                    (0, 1) => Complex64::new(0.0, -s * h),
                    (1, 0) => Complex64::new(0.0, s * h),
                    _ => Complex64::new(h, 0.0),
                })
            })
            .collect();
        Self::new(elements)
    }

    /// Qubit POVM measuring all three Pauli bases with equal weight
    pub fn pauli_povm() -> Result<Self> {
        let parts = [Self::x_povm()?, Self::y_povm()?, Self::z_povm(2)?];
        let third = 1.0 / 3.0;
        let elements = parts
            .iter()
            .flat_map(|p| p.elements.iter())
            .map(|e| DTensor::<Complex64, 2>::from_fn([2, 2], |idx| e[[idx[0], idx[1]]] * third))
            .collect();
        Self::new(elements)
    }
}

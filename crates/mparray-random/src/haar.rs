//! Haar-distributed random unitary matrices

use mdarray::DTensor;
use mparray_core::linalg::qr_backend;
use num_complex::{Complex64, ComplexFloat};
use rand::Rng;

use crate::error::{RandomError, Result};
use crate::gaussian::Gaussian;

/// Sample from the Haar measure on the unitary group of dimension `dim`
///
/// A complex Ginibre matrix scaled by `1/sqrt(2)` is QR-decomposed and the
/// columns of Q are rephased by the phases of the diagonal of R. Without the
/// rephasing the distribution would inherit the phase convention of the
/// decomposition and not be Haar.
pub fn haar_unitary<R: Rng>(rng: &mut R, dim: usize) -> Result<DTensor<Complex64, 2>> {
    if dim == 0 {
        return Err(RandomError::BadDimension {
            what: "dim",
            value: 0,
        });
    }

    let scale = 1.0 / 2.0_f64.sqrt();
    let mut z = DTensor::<Complex64, 2>::from_fn([dim, dim], |_| {
        Complex64::standard_normal(rng) * scale
    });

    let (q, r) = qr_backend(z.as_mut());

    // A zero diagonal entry of R has measure zero for Ginibre input
    Ok(DTensor::<Complex64, 2>::from_fn([dim, dim], |idx| {
        let d = r[[idx[1], idx[1]]];
        q[[idx[0], idx[1]]] * (d / d.abs())
    }))
}

/// [`haar_unitary`] drawing from the thread-local generator
pub fn haar_unitary_default(dim: usize) -> Result<DTensor<Complex64, 2>> {
    haar_unitary(&mut rand::thread_rng(), dim)
}

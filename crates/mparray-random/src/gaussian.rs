//! Gaussian-distributed arrays and matrices derived from them

use mdarray::DTensor;
use mparray_core::{local_from_data, LocalTensor, LocalTensorOps, Scalar};
use num_complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{RandomError, Result};

/// Scalars that can be drawn from a standard normal distribution
///
/// For complex scalars the real and imaginary parts are independent draws of
/// unit variance each.
pub trait Gaussian: Scalar {
    /// One standard-normal draw
    fn standard_normal<R: Rng>(rng: &mut R) -> Self;
}

impl Gaussian for f64 {
    fn standard_normal<R: Rng>(rng: &mut R) -> Self {
        StandardNormal.sample(rng)
    }
}

impl Gaussian for Complex64 {
    fn standard_normal<R: Rng>(rng: &mut R) -> Self {
        Complex64::new(StandardNormal.sample(rng), StandardNormal.sample(rng))
    }
}

/// Dense tensor with independent standard-normal entries
pub fn random_tensor<T: Gaussian, R: Rng>(rng: &mut R, dims: &[usize]) -> LocalTensor<T> {
    let size: usize = dims.iter().product();
    let data: Vec<T> = (0..size).map(|_| T::standard_normal(rng)).collect();
    local_from_data(data, dims)
}

/// Square matrix with independent standard-normal entries
pub fn random_matrix<T: Gaussian, R: Rng>(rng: &mut R, dim: usize) -> DTensor<T, 2> {
    DTensor::<T, 2>::from_fn([dim, dim], |_| T::standard_normal(rng))
}

/// Random vector of shape `(ldim,) * sites`, normalized to unit norm
pub fn random_vec<T: Gaussian, R: Rng>(
    rng: &mut R,
    sites: usize,
    ldim: usize,
) -> Result<LocalTensor<T>> {
    if sites == 0 || ldim == 0 {
        return Err(RandomError::BadDimension {
            what: "sites or ldim",
            value: 0,
        });
    }
    let dims = vec![ldim; sites];
    let psi = random_tensor::<T, R>(rng, &dims);
    let norm: f64 = psi.data().iter().map(|x| x.abs_sq()).sum::<f64>().sqrt();
    let data: Vec<T> = psi.data().iter().map(|&x| x.mul_real(1.0 / norm)).collect();
    Ok(local_from_data(data, &dims))
}

/// Random operator of shape `(ldim,) * 2 * sites` in global axis order
///
/// With `hermitian` the conjugate transpose is added (so diagonal variance
/// doubles); `normalized` then rescales to unit Frobenius norm.
pub fn random_op<T: Gaussian, R: Rng>(
    rng: &mut R,
    sites: usize,
    ldim: usize,
    hermitian: bool,
    normalized: bool,
) -> Result<LocalTensor<T>> {
    if sites == 0 || ldim == 0 {
        return Err(RandomError::BadDimension {
            what: "sites or ldim",
            value: 0,
        });
    }
    let n = ldim.pow(sites as u32);
    let mut op = random_matrix::<T, R>(rng, n);

    if hermitian {
        op = DTensor::<T, 2>::from_fn([n, n], |idx| op[[idx[0], idx[1]]] + op[[idx[1], idx[0]]].conj());
    }
    if normalized {
        let norm: f64 = frobenius_norm(&op);
        op = DTensor::<T, 2>::from_fn([n, n], |idx| op[[idx[0], idx[1]]].mul_real(1.0 / norm));
    }

    Ok(matrix_to_global(&op, sites, ldim))
}

/// Random positive semidefinite operator with unit trace
///
/// Built as the trace-normalized Gram matrix of a complex Ginibre matrix;
/// returned with shape `(ldim,) * 2 * sites` in global axis order.
pub fn random_density_matrix<R: Rng>(
    rng: &mut R,
    sites: usize,
    ldim: usize,
) -> Result<LocalTensor<Complex64>> {
    if sites == 0 || ldim == 0 {
        return Err(RandomError::BadDimension {
            what: "sites or ldim",
            value: 0,
        });
    }
    let n = ldim.pow(sites as u32);
    let g = random_matrix::<Complex64, R>(rng, n);

    // rho = G^H G, positive semidefinite by construction
    let mut rho = DTensor::<Complex64, 2>::from_fn([n, n], |idx| {
        let mut acc = Complex64::new(0.0, 0.0);
        for k in 0..n {
            acc += g[[k, idx[0]]].conj() * g[[k, idx[1]]];
        }
        acc
    });

    let mut tr = Complex64::new(0.0, 0.0);
    for i in 0..n {
        tr += rho[[i, i]];
    }
    rho = DTensor::<Complex64, 2>::from_fn([n, n], |idx| rho[[idx[0], idx[1]]] / tr.re);

    Ok(matrix_to_global(&rho, sites, ldim))
}

/// Frobenius norm of a matrix
pub(crate) fn frobenius_norm<T: Scalar>(m: &DTensor<T, 2>) -> f64 {
    let mut acc = 0.0;
    for i in 0..m.dim(0) {
        for j in 0..m.dim(1) {
            acc += m[[i, j]].abs_sq();
        }
    }
    acc.sqrt()
}

/// Reshape a `ldim^sites` square matrix into `(ldim,) * 2 * sites`
///
/// The flat reshape keeps the row legs first and the column legs last, i.e.
/// global axis order.
fn matrix_to_global<T: Scalar>(m: &DTensor<T, 2>, sites: usize, ldim: usize) -> LocalTensor<T> {
    let n = m.dim(0);
    let mut data = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            data.push(m[[i, j]]);
        }
    }
    let dims = vec![ldim; 2 * sites];
    local_from_data(data, &dims)
}

//! Backend dispatch for the dense linear algebra this crate needs
//!
//! QR is delegated to `mdarray-linalg` with the faer backend; everything else
//! (transfer matrices, small matrix products) is explicit loops elsewhere.

use mdarray::{DSlice, DTensor};
use mdarray_linalg::qr::QR;
use mdarray_linalg_faer::Faer;

use crate::types::Scalar;

/// Compute the full QR decomposition of a matrix
///
/// For an m x n input returns `(Q, R)` with Q m x m unitary and R m x n upper
/// triangular.
pub fn qr_backend<T: Scalar>(a: &mut DSlice<T, 2>) -> (DTensor<T, 2>, DTensor<T, 2>) {
    let bd = Faer;
    bd.qr(a)
}

/// Thin QR: Q m x k and R k x n with `k = min(m, n)`
pub fn qr_thin<T: Scalar>(a: &mut DSlice<T, 2>) -> (DTensor<T, 2>, DTensor<T, 2>) {
    let m = a.dim(0);
    let n = a.dim(1);
    let k = m.min(n);
    let (q_full, r_full) = qr_backend(a);

    let q = DTensor::<T, 2>::from_fn([m, k], |idx| q_full[[idx[0], idx[1]]]);
    let r = DTensor::<T, 2>::from_fn([k, n], |idx| r_full[[idx[0], idx[1]]]);
    (q, r)
}

//! Partial traces of operator chains onto contiguous windows
//!
//! `reductions_mpo` turns a mixed-state chain into the lazy sequence of its
//! reduced operators on every window of a fixed width, in increasing
//! window-start order. The traced-out sites collapse into boundary
//! environments; right environments are computed once up front, the left
//! environment is folded forward as the iterator advances.

use mdarray::DTensor;

use crate::error::Result;
use crate::mparray::{traced_site, MPArray};
use crate::types::{local_from_data, LocalTensor, LocalTensorOps, Scalar};

/// Lift a 1-leg (state) chain to the 2-leg (projector) chain `|psi><psi|`
pub fn mps_to_mpo<T: Scalar>(mps: &MPArray<T>) -> Result<MPArray<T>> {
    use crate::error::CoreError;

    let mut ltens = Vec::with_capacity(mps.len());
    for site in 0..mps.len() {
        let t = mps.lt(site);
        if t.num_legs() != 1 {
            return Err(CoreError::LegCountMismatch {
                site,
                expected: 1,
                got: t.num_legs(),
            });
        }
        let l = t.left_dim();
        let r = t.right_dim();
        let d = t.phys_dims()[0];
        let data = t.data();

        let mut out = vec![T::zero(); l * l * d * d * r * r];
        for la in 0..l {
            for lb in 0..l {
                for dr in 0..d {
                    for dc in 0..d {
                        for ra in 0..r {
                            for rb in 0..r {
                                let ket = data[(la * d + dr) * r + ra];
                                let bra = data[(lb * d + dc) * r + rb].conj();
                                out[((((la * l + lb) * d + dr) * d + dc) * r + ra) * r + rb] =
                                    ket * bra;
                            }
                        }
                    }
                }
            }
        }
        ltens.push(local_from_data(out, &[l * l, d, d, r * r]));
    }
    MPArray::new(ltens)
}

/// Reduced operators on every `width`-site window of `mpa`
///
/// The yielded operators are not renormalized; their traces all equal the
/// trace of `mpa`. Consuming only a prefix never computes later windows.
pub fn reductions_mpo<T: Scalar>(mpa: &MPArray<T>, width: usize) -> Result<Reductions<'_, T>> {
    use crate::error::CoreError;

    if width == 0 || width > mpa.len() {
        return Err(CoreError::InvalidOperation {
            message: format!(
                "window width {} out of range for {} sites",
                width,
                mpa.len()
            ),
        });
    }

    // Validates 2 square legs per site as a side effect
    let traced: Vec<Vec<T>> = (0..mpa.len())
        .map(|site| traced_site(mpa.lt(site), site))
        .collect::<Result<_>>()?;

    // right_envs[k] closes the chain over sites k.. ; right_envs[len] = [1]
    let mut right_envs = vec![Vec::new(); mpa.len() + 1];
    right_envs[mpa.len()] = vec![T::one()];
    for site in (0..mpa.len()).rev() {
        let l = mpa.lt(site).left_dim();
        let r = mpa.lt(site).right_dim();
        let prev = &right_envs[site + 1];
        let mut env = vec![T::zero(); l];
        for (l_i, e) in env.iter_mut().enumerate() {
            let mut acc = T::zero();
            for r_i in 0..r {
                acc = acc + traced[site][l_i * r + r_i] * prev[r_i];
            }
            *e = acc;
        }
        right_envs[site] = env;
    }

    Ok(Reductions {
        mpa,
        width,
        traced,
        right_envs,
        left_env: vec![T::one()],
        start: 0,
    })
}

/// Iterator returned by [`reductions_mpo`]
#[derive(Debug)]
pub struct Reductions<'a, T: Scalar> {
    mpa: &'a MPArray<T>,
    width: usize,
    traced: Vec<Vec<T>>,
    right_envs: Vec<Vec<T>>,
    left_env: Vec<T>,
    start: usize,
}

impl<T: Scalar> Iterator for Reductions<'_, T> {
    type Item = MPArray<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.start;
        if n + self.width > self.mpa.len() {
            return None;
        }

        let mut window: Vec<LocalTensor<T>> = self
            .mpa
            .local_tensors()[n..n + self.width]
            .to_vec();

        // Close the left boundary with the accumulated environment
        let l = window[0].left_dim();
        let left = DTensor::<T, 2>::from_fn([1, l], |idx| self.left_env[idx[1]]);
        let closed = window[0].mul_left_matrix(&left);
        window[0] = closed;

        // Close the right boundary with the precomputed environment
        let last = self.width - 1;
        let r = window[last].right_dim();
        let renv = &self.right_envs[n + self.width];
        let right = DTensor::<T, 2>::from_fn([r, 1], |idx| renv[idx[0]]);
        let closed = window[last].mul_right_matrix(&right);
        window[last] = closed;

        // Fold site n into the left environment for the next window
        let lt = self.mpa.lt(n);
        let (lo, ro) = (lt.left_dim(), lt.right_dim());
        let mut next_env = vec![T::zero(); ro];
        for (r_i, e) in next_env.iter_mut().enumerate() {
            let mut acc = T::zero();
            for l_i in 0..lo {
                acc = acc + self.left_env[l_i] * self.traced[n][l_i * ro + r_i];
            }
            *e = acc;
        }
        self.left_env = next_env;
        self.start += 1;

        Some(MPArray::from_tensors_unchecked(window))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.mpa.len() + 1 - self.width - self.start;
        (remaining, Some(remaining))
    }
}

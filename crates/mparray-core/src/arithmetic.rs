//! Addition and structured sums of matrix-product arrays
//!
//! Addition is the direct-sum construction: bond dimensions add at every
//! internal bond, boundary tensors are concatenated along their single bond.

use crate::error::{CoreError, Result};
use crate::mparray::MPArray;
use crate::types::{local_from_data, LocalTensor, LocalTensorOps, Scalar};

impl<T: Scalar> MPArray<T> {
    /// Add two chains element-wise
    ///
    /// The result has bond dimensions equal to the sums of the input bond
    /// dimensions; no compression is attempted.
    pub fn add(&self, other: &Self) -> Result<Self> {
        if self.len() != other.len() {
            return Err(CoreError::LengthMismatch {
                what: "sites",
                expected: self.len(),
                got: other.len(),
            });
        }
        for site in 0..self.len() {
            if self.lt(site).phys_dims() != other.lt(site).phys_dims() {
                return Err(CoreError::InvalidOperation {
                    message: format!(
                        "physical dimensions mismatch at site {}: {:?} vs {:?}",
                        site,
                        self.lt(site).phys_dims(),
                        other.lt(site).phys_dims()
                    ),
                });
            }
        }

        let n = self.len();
        if n == 1 {
            let a = self.lt(0);
            let b = other.lt(0);
            let data: Vec<T> = a
                .data()
                .iter()
                .zip(b.data().iter())
                .map(|(&x, &y)| x + y)
                .collect();
            let dims = a.dims();
            return Self::new(vec![local_from_data(data, &dims)]);
        }

        let mut ltens = Vec::with_capacity(n);
        for site in 0..n {
            let a = self.lt(site);
            let b = other.lt(site);
            let p = a.phys_size();
            let (la, ra) = (a.left_dim(), a.right_dim());
            let (lb, rb) = (b.left_dim(), b.right_dim());
            let da = a.data();
            let db = b.data();

            let tensor = if site == 0 {
                // Concatenate along the right bond
                let r = ra + rb;
                let mut out = vec![T::zero(); p * r];
                for p_i in 0..p {
                    for r_i in 0..ra {
                        out[p_i * r + r_i] = da[p_i * ra + r_i];
                    }
                    for r_i in 0..rb {
                        out[p_i * r + ra + r_i] = db[p_i * rb + r_i];
                    }
                }
                let mut dims = vec![1];
                dims.extend(a.phys_dims());
                dims.push(r);
                local_from_data(out, &dims)
            } else if site == n - 1 {
                // Concatenate along the left bond
                let l = la + lb;
                let mut out = vec![T::zero(); l * p];
                for l_i in 0..la {
                    for p_i in 0..p {
                        out[l_i * p + p_i] = da[l_i * p + p_i];
                    }
                }
                for l_i in 0..lb {
                    for p_i in 0..p {
                        out[(la + l_i) * p + p_i] = db[l_i * p + p_i];
                    }
                }
                let mut dims = vec![l];
                dims.extend(a.phys_dims());
                dims.push(1);
                local_from_data(out, &dims)
            } else {
                // Block diagonal in the bond indices
                let l = la + lb;
                let r = ra + rb;
                let mut out = vec![T::zero(); l * p * r];
                for l_i in 0..la {
                    for p_i in 0..p {
                        for r_i in 0..ra {
                            out[(l_i * p + p_i) * r + r_i] = da[(l_i * p + p_i) * ra + r_i];
                        }
                    }
                }
                for l_i in 0..lb {
                    for p_i in 0..p {
                        for r_i in 0..rb {
                            out[((la + l_i) * p + p_i) * r + ra + r_i] =
                                db[(l_i * p + p_i) * rb + r_i];
                        }
                    }
                }
                let mut dims = vec![l];
                dims.extend(a.phys_dims());
                dims.push(r);
                local_from_data(out, &dims)
            };
            ltens.push(tensor);
        }

        Ok(Self::from_tensors_unchecked(ltens))
    }

    /// Sum several chains of identical shape
    pub fn sumup(mpas: &[Self]) -> Result<Self> {
        let (first, rest) = mpas.split_first().ok_or(CoreError::Empty)?;
        let mut acc = first.clone();
        for mpa in rest {
            acc = acc.add(mpa)?;
        }
        Ok(acc)
    }

    /// Embed a 2-leg chain into a longer chain, with identities elsewhere
    ///
    /// Sites `[startsite, startsite + self.len())` carry this operator; every
    /// other site carries the `ldim x ldim` identity.
    pub fn embed(&self, sites: usize, startsite: usize, ldim: usize) -> Result<Self> {
        if startsite + self.len() > sites {
            return Err(CoreError::InvalidOperation {
                message: format!(
                    "cannot embed {} sites at {} into {} sites",
                    self.len(),
                    startsite,
                    sites
                ),
            });
        }
        for site in 0..self.len() {
            if self.num_legs(site) != 2 {
                return Err(CoreError::LegCountMismatch {
                    site,
                    expected: 2,
                    got: self.num_legs(site),
                });
            }
        }

        let eye = identity_ltens::<T>(ldim);
        let mut ltens = Vec::with_capacity(sites);
        for _ in 0..startsite {
            ltens.push(eye.clone());
        }
        ltens.extend(self.local_tensors().iter().cloned());
        for _ in startsite + self.len()..sites {
            ltens.push(eye.clone());
        }
        Self::new(ltens)
    }

    /// Sum identical-shape 2-leg terms embedded at successive start sites
    ///
    /// Term `k` acts on sites `[k, k + w)` of a `len + w - 1` site chain,
    /// with identities elsewhere.
    pub fn local_sum(terms: &[Self]) -> Result<Self> {
        let (first, rest) = terms.split_first().ok_or(CoreError::Empty)?;
        let w = first.len();
        let shape = first.shape();
        for term in rest {
            if term.len() != w {
                return Err(CoreError::LengthMismatch {
                    what: "term sites",
                    expected: w,
                    got: term.len(),
                });
            }
            if term.shape() != shape {
                return Err(CoreError::InvalidOperation {
                    message: "local terms must have identical shapes".to_string(),
                });
            }
        }
        for (site, dims) in shape.iter().enumerate() {
            if dims.len() != 2 || dims[0] != dims[1] || dims[0] != shape[0][0] {
                return Err(CoreError::InvalidOperation {
                    message: format!(
                        "local terms must have uniform square legs, got {:?} at site {}",
                        dims, site
                    ),
                });
            }
        }

        let ldim = shape[0][0];
        let sites = terms.len() + w - 1;
        let embedded: Vec<Self> = terms
            .iter()
            .enumerate()
            .map(|(k, term)| term.embed(sites, k, ldim))
            .collect::<Result<_>>()?;
        Self::sumup(&embedded)
    }
}

/// The `(1, d, d, 1)` identity local tensor
fn identity_ltens<T: Scalar>(d: usize) -> LocalTensor<T> {
    let mut data = vec![T::zero(); d * d];
    for i in 0..d {
        data[i * d + i] = T::one();
    }
    local_from_data(data, &[1, d, d, 1])
}

impl<T: Scalar> std::ops::Add for &MPArray<T> {
    type Output = Result<MPArray<T>>;

    fn add(self, other: Self) -> Self::Output {
        MPArray::add(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_chain(sites: usize, d: usize, value: f64) -> MPArray<f64> {
        let ltens = (0..sites)
            .map(|site| {
                let v = if site == sites - 1 { value } else { 1.0 };
                local_from_data(vec![v; d], &[1, d, 1])
            })
            .collect();
        MPArray::new(ltens).unwrap()
    }

    #[test]
    fn test_add_sums_entries() {
        let a = constant_chain(3, 2, 1.0);
        let b = constant_chain(3, 2, 2.0);
        let c = a.add(&b).unwrap();
        assert_eq!(c.ranks(), vec![2, 2]);
        // (1 + 2) summed over 2^3 entries
        assert!((c.sum() - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_single_site() {
        let a = constant_chain(1, 4, 2.0);
        let b = constant_chain(1, 4, 3.0);
        let c = (&a + &b).unwrap();
        assert_eq!(c.ranks().len(), 0);
        assert!((c.sum() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_preserves_entries() {
        let a = constant_chain(2, 2, 1.5);
        let b = constant_chain(2, 2, 0.5);
        let c = a.add(&b).unwrap();
        let arr = c.to_array();
        for &x in arr.data() {
            assert!((x - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_add_shape_mismatch() {
        let a = constant_chain(2, 2, 1.0);
        let b = constant_chain(2, 3, 1.0);
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn test_sumup() {
        let parts: Vec<_> = (1..=3).map(|k| constant_chain(2, 2, k as f64)).collect();
        let total = MPArray::sumup(&parts).unwrap();
        assert!((total.sum() - 24.0).abs() < 1e-12);
        assert_eq!(total.ranks(), vec![3]);
    }

    #[test]
    fn test_embed_identity_elsewhere() {
        // Single-site operator diag(2, 2) embedded in 3 sites
        let op = local_from_data(vec![2.0, 0.0, 0.0, 2.0], &[1, 2, 2, 1]);
        let term = MPArray::new(vec![op]).unwrap();
        let embedded = term.embed(3, 1, 2).unwrap();
        assert_eq!(embedded.len(), 3);
        // tr(I (x) diag(2,2) (x) I) = 2 * 4 * 2
        assert!((embedded.trace().unwrap() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_local_sum_window_count() {
        // Two single-site terms over 2 sites
        let op = local_from_data(vec![1.0, 0.0, 0.0, -1.0], &[1, 2, 2, 1]);
        let term = MPArray::new(vec![op]).unwrap();
        let total = MPArray::local_sum(&[term.clone(), term]).unwrap();
        assert_eq!(total.len(), 2);
        // tr(Z (x) I + I (x) Z) = 0
        assert!(total.trace().unwrap().abs() < 1e-12);
    }
}

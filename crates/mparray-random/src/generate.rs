//! Rank-constrained generation of matrix-product arrays
//!
//! `generate` turns a flexible (sites, physical-dimension, rank) request plus
//! a local-tensor filler into a structurally valid chain. The polymorphic
//! specifications are normalized once here; everything downstream sees plain
//! per-site tuples.

use mparray_core::{full_rank, LocalTensor, MPArray, Scalar};

use crate::error::{RandomError, Result};

/// Physical-dimension specification
#[derive(Debug, Clone)]
pub enum LdimSpec {
    /// One physical leg per site, same dimension everywhere
    Uniform(usize),
    /// The same per-axis dimension tuple on every site
    SameAxes(Vec<usize>),
    /// Explicit per-site tuples, one entry per site
    Explicit(Vec<Vec<usize>>),
}

impl From<usize> for LdimSpec {
    fn from(dim: usize) -> Self {
        Self::Uniform(dim)
    }
}

impl From<Vec<usize>> for LdimSpec {
    fn from(axes: Vec<usize>) -> Self {
        Self::SameAxes(axes)
    }
}

impl From<&[usize]> for LdimSpec {
    fn from(axes: &[usize]) -> Self {
        Self::SameAxes(axes.to_vec())
    }
}

impl From<Vec<Vec<usize>>> for LdimSpec {
    fn from(sites: Vec<Vec<usize>>) -> Self {
        Self::Explicit(sites)
    }
}

impl LdimSpec {
    /// Expand into one dimension tuple per site
    pub fn normalize(&self, sites: usize) -> Result<Vec<Vec<usize>>> {
        match self {
            Self::Uniform(d) => Ok(vec![vec![*d]; sites]),
            Self::SameAxes(axes) => Ok(vec![axes.clone(); sites]),
            Self::Explicit(per_site) => {
                if per_site.len() != sites {
                    return Err(RandomError::SpecLength {
                        what: "physical dimensions",
                        expected: sites,
                        got: per_site.len(),
                    });
                }
                Ok(per_site.clone())
            }
        }
    }
}

/// Bond-rank specification
#[derive(Debug, Clone)]
pub enum RankSpec {
    /// The same rank at every bond
    Uniform(usize),
    /// Explicit ranks, one entry per internal bond (`sites - 1`)
    PerBond(Vec<usize>),
}

impl From<usize> for RankSpec {
    fn from(rank: usize) -> Self {
        Self::Uniform(rank)
    }
}

impl From<Vec<usize>> for RankSpec {
    fn from(ranks: Vec<usize>) -> Self {
        Self::PerBond(ranks)
    }
}

impl RankSpec {
    /// Expand into one rank per internal bond
    pub fn normalize(&self, sites: usize) -> Result<Vec<usize>> {
        match self {
            Self::Uniform(r) => Ok(vec![*r; sites - 1]),
            Self::PerBond(ranks) => {
                if ranks.len() != sites - 1 {
                    return Err(RandomError::SpecLength {
                        what: "bond ranks",
                        expected: sites - 1,
                        got: ranks.len(),
                    });
                }
                Ok(ranks.clone())
            }
        }
    }
}

/// Build a chain with the requested shape and ranks from a local-tensor filler
///
/// `fill` is called once per site with the full local shape
/// `(rank_left, d_1, .., d_k, rank_right)`. Unless `force_rank` is set, every
/// requested rank is capped at the maximum sensible rank for that cut.
pub fn generate<T, F, L, K>(
    sites: usize,
    ldim: L,
    rank: K,
    fill: &mut F,
    force_rank: bool,
) -> Result<MPArray<T>>
where
    T: Scalar,
    F: FnMut(&[usize]) -> LocalTensor<T>,
    L: Into<LdimSpec>,
    K: Into<RankSpec>,
{
    if sites == 0 {
        return Err(RandomError::BadDimension {
            what: "sites",
            value: 0,
        });
    }
    let ldims = ldim.into().normalize(sites)?;
    let mut ranks = rank.into().normalize(sites)?;

    if !force_rank {
        for (r, cap) in ranks.iter_mut().zip(full_rank(&ldims)) {
            *r = (*r).min(cap);
        }
    }

    let mut bonds = Vec::with_capacity(sites + 1);
    bonds.push(1);
    bonds.extend(ranks);
    bonds.push(1);

    let ltens = ldims
        .iter()
        .enumerate()
        .map(|(n, dims)| {
            let mut shape = Vec::with_capacity(dims.len() + 2);
            shape.push(bonds[n]);
            shape.extend_from_slice(dims);
            shape.push(bonds[n + 1]);
            fill(&shape)
        })
        .collect();

    Ok(MPArray::new(ltens)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mparray_core::{local_zeros, LocalTensorOps};

    fn zero_fill(shape: &[usize]) -> LocalTensor<f64> {
        local_zeros(shape)
    }

    #[test]
    fn test_forced_rank_is_exact() {
        let mpa = generate(4, 2, 10, &mut zero_fill, true).unwrap();
        assert_eq!(mpa.ranks(), vec![10, 10, 10]);
        assert_eq!(mpa.shape(), vec![vec![2]; 4]);
        for site in 0..4 {
            assert!(mpa.lt(site).data().iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_rank_capped_without_force() {
        let mpa = generate(4, 2, 10, &mut zero_fill, false).unwrap();
        assert_eq!(mpa.ranks(), vec![2, 4, 2]);
    }

    #[test]
    fn test_rank_cap_respects_bound() {
        let mpa = generate(5, 3, 1000, &mut zero_fill, false).unwrap();
        let bound = full_rank(&mpa.shape());
        for (r, b) in mpa.ranks().iter().zip(bound.iter()) {
            assert!(r <= b);
        }
    }

    #[test]
    fn test_same_axes_spec() {
        let mpa = generate(4, vec![1usize, 2], 10, &mut zero_fill, true).unwrap();
        assert_eq!(mpa.shape(), vec![vec![1, 2]; 4]);
        assert_eq!(mpa.ranks(), vec![10, 10, 10]);
    }

    #[test]
    fn test_explicit_spec() {
        let ldims = vec![vec![1], vec![2, 3], vec![4, 5], vec![1]];
        let mpa = generate(4, ldims.clone(), 10, &mut zero_fill, true).unwrap();
        assert_eq!(mpa.shape(), ldims);
    }

    #[test]
    fn test_explicit_spec_wrong_length() {
        let ldims = vec![vec![2], vec![2]];
        let err = generate(3, ldims, 4, &mut zero_fill, true).unwrap_err();
        assert!(matches!(err, RandomError::SpecLength { .. }));
    }

    #[test]
    fn test_per_bond_rank_wrong_length() {
        let err = generate(4, 2, vec![3usize, 3], &mut zero_fill, true).unwrap_err();
        assert!(matches!(err, RandomError::SpecLength { .. }));
    }

    #[test]
    fn test_adjacency_always_holds() {
        let mpa = generate(6, 2, vec![2usize, 5, 3, 7, 1], &mut zero_fill, true).unwrap();
        for site in 0..5 {
            assert_eq!(
                mpa.lt(site).dims().last().copied(),
                Some(mpa.lt(site + 1).dims()[0])
            );
        }
    }
}

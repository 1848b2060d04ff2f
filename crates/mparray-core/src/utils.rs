//! Axis-order utilities for dense arrays
//!
//! Operators on `sites` sites appear in two axis orders: "global", where all
//! row legs precede all column legs `(r_1, .., r_s, c_1, .., c_s)`, and
//! "local", where the legs of each site are adjacent
//! `(r_1, c_1, .., r_s, c_s)`. Matrix-product construction wants local order;
//! dense matrices are a flat reshape of global order.

use crate::error::{CoreError, Result};
use crate::types::{LocalTensor, LocalTensorOps, Scalar};

/// Reorder a dense array from global to local axis order
///
/// The array must have `k * sites` axes for some integer `k`.
pub fn global_to_local<T: Scalar>(array: &LocalTensor<T>, sites: usize) -> Result<LocalTensor<T>> {
    let perm = axis_permutation(array.rank(), sites, true)?;
    Ok(array.permute(&perm[..]).to_tensor())
}

/// Reorder a dense array from local to global axis order
pub fn local_to_global<T: Scalar>(array: &LocalTensor<T>, sites: usize) -> Result<LocalTensor<T>> {
    let perm = axis_permutation(array.rank(), sites, false)?;
    Ok(array.permute(&perm[..]).to_tensor())
}

fn axis_permutation(rank: usize, sites: usize, to_local: bool) -> Result<Vec<usize>> {
    if sites == 0 || rank % sites != 0 {
        return Err(CoreError::InvalidOperation {
            message: format!("array rank {} is not a multiple of {} sites", rank, sites),
        });
    }
    let legs = rank / sites;

    let mut perm = Vec::with_capacity(rank);
    if to_local {
        // Destination axis (site, leg) comes from global axis leg * sites + site
        for site in 0..sites {
            for leg in 0..legs {
                perm.push(leg * sites + site);
            }
        }
    } else {
        // Destination axis (leg, site) comes from local axis site * legs + leg
        for leg in 0..legs {
            for site in 0..sites {
                perm.push(site * legs + leg);
            }
        }
    }
    Ok(perm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::local_from_data;

    #[test]
    fn test_roundtrip() {
        // 2 sites, 2 legs each: global (r1, r2, c1, c2) with dims (2, 3, 4, 5)
        let dims = [2usize, 3, 4, 5];
        let size: usize = dims.iter().product();
        let data: Vec<f64> = (0..size).map(|x| x as f64).collect();
        let t = local_from_data(data.clone(), &dims);

        let local = global_to_local(&t, 2).unwrap();
        assert_eq!(local.dims(), vec![2, 4, 3, 5]);

        let back = local_to_global(&local, 2).unwrap();
        assert_eq!(back.dims(), vec![2, 3, 4, 5]);
        assert_eq!(back.data(), &data[..]);
    }

    #[test]
    fn test_single_site_is_identity() {
        let t = local_from_data(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let out = global_to_local(&t, 1).unwrap();
        assert_eq!(out.data(), t.data());
    }

    #[test]
    fn test_rank_not_multiple() {
        let t: LocalTensor<f64> = local_from_data(vec![0.0; 8], &[2, 2, 2]);
        assert!(global_to_local(&t, 2).is_err());
    }
}

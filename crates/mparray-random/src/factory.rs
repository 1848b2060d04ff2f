//! Factories for matrix-product states, operators and density operators

use mdarray::DTensor;
use mparray_core::{
    local_from_data, local_zeros, mps_to_mpo, LocalTensor, LocalTensorOps, MPArray, Scalar,
};
use mparray_core::utils::global_to_local;
use num_complex::Complex64;
use rand::Rng;

use crate::error::{RandomError, Result};
use crate::gaussian::{random_op, random_tensor, Gaussian};
use crate::generate::{generate, LdimSpec, RankSpec};
use crate::haar::haar_unitary;

/// Random chain with standard-normal local tensors
///
/// With `normalized` the result is rescaled to unit norm. Ranks are capped at
/// the maximum sensible value unless `force_rank` is set.
pub fn random_mpa<T, R, L, K>(
    rng: &mut R,
    sites: usize,
    ldim: L,
    rank: K,
    normalized: bool,
    force_rank: bool,
) -> Result<MPArray<T>>
where
    T: Gaussian,
    R: Rng,
    L: Into<LdimSpec>,
    K: Into<RankSpec>,
{
    let mut fill = |shape: &[usize]| random_tensor::<T, R>(rng, shape);
    let mut mpa = generate(sites, ldim, rank, &mut fill, force_rank)?;
    if normalized {
        let norm = mpa.norm();
        mpa.div_real_inplace(norm);
    }
    Ok(mpa)
}

/// [`random_mpa`] drawing from the thread-local generator
pub fn random_mpa_default<T, L, K>(
    sites: usize,
    ldim: L,
    rank: K,
    normalized: bool,
    force_rank: bool,
) -> Result<MPArray<T>>
where
    T: Gaussian,
    L: Into<LdimSpec>,
    K: Into<RankSpec>,
{
    random_mpa(&mut rand::thread_rng(), sites, ldim, rank, normalized, force_rank)
}

/// Chain of the requested shape with all entries zero
pub fn zero<T, L, K>(sites: usize, ldim: L, rank: K, force_rank: bool) -> Result<MPArray<T>>
where
    T: Scalar,
    L: Into<LdimSpec>,
    K: Into<RankSpec>,
{
    let mut fill = |shape: &[usize]| local_zeros::<T>(shape);
    generate(sites, ldim, rank, &mut fill, force_rank)
}

/// Identity operator as a rank-1 chain
pub fn eye<T: Scalar>(sites: usize, ldim: usize) -> Result<MPArray<T>> {
    eye_per_site(&vec![ldim; sites])
}

/// Identity operator with per-site local dimensions
pub fn eye_per_site<T: Scalar>(ldims: &[usize]) -> Result<MPArray<T>> {
    if ldims.is_empty() {
        return Err(RandomError::BadDimension {
            what: "sites",
            value: 0,
        });
    }
    let factors: Vec<LocalTensor<T>> = ldims
        .iter()
        .map(|&d| {
            let mut data = vec![T::zero(); d * d];
            for i in 0..d {
                data[i * d + i] = T::one();
            }
            local_from_data(data, &[d, d])
        })
        .collect();
    Ok(MPArray::from_kron(&factors)?)
}

/// Chain representing the hyper-diagonal array with the given entries
///
/// The result has one physical leg per site; entry `(i, .., i)` equals
/// `entries[i]` and all off-diagonal entries vanish. The bond rank equals the
/// number of entries and the chain is returned in the canonical gauge
/// `(sites - 1, sites)`.
pub fn diagonal_mpa<T: Scalar>(entries: &[T], sites: usize) -> Result<MPArray<T>> {
    if sites == 0 {
        return Err(RandomError::BadDimension {
            what: "sites",
            value: 0,
        });
    }
    let n = entries.len();
    if n == 0 {
        return Err(RandomError::BadDimension {
            what: "entries",
            value: 0,
        });
    }

    if sites < 2 {
        return Ok(MPArray::new(vec![local_from_data(
            entries.to_vec(),
            &[1, n, 1],
        )])?);
    }

    // Leftmost: identity copy tensor; interior: 3-way copy tensor;
    // rightmost: the entries on the diagonal.
    let mut left = vec![T::zero(); n * n];
    for i in 0..n {
        left[i * n + i] = T::one();
    }
    let leftmost = local_from_data(left, &[1, n, n]);

    let mut center = vec![T::zero(); n * n * n];
    for i in 0..n {
        center[(i * n + i) * n + i] = T::one();
    }
    let center = local_from_data(center, &[n, n, n]);

    let mut right = vec![T::zero(); n * n];
    for (i, &e) in entries.iter().enumerate() {
        right[i * n + i] = e;
    }
    let rightmost = local_from_data(right, &[n, n, 1]);

    let mut ltens = Vec::with_capacity(sites);
    ltens.push(leftmost);
    for _ in 0..sites - 2 {
        ltens.push(center.clone());
    }
    ltens.push(rightmost);

    Ok(MPArray::with_canonical_form(ltens, (sites - 1, sites))?)
}

/// Random matrix-product operator with paired physical legs
///
/// With `hermitian` each local tensor is symmetrized in place
/// (`l + swap(l)^H`); this keeps the rank and makes every local block
/// Hermitian but does not in general make the contracted operator Hermitian
/// for longer chains. With `normalized` the operator is rescaled to unit
/// Frobenius norm.
pub fn random_mpo<R: Rng, K: Into<RankSpec>>(
    rng: &mut R,
    sites: usize,
    ldim: usize,
    rank: K,
    hermitian: bool,
    normalized: bool,
    force_rank: bool,
) -> Result<MPArray<Complex64>> {
    let mut mpo = random_mpa::<Complex64, _, _, _>(
        rng,
        sites,
        vec![ldim, ldim],
        rank,
        false,
        force_rank,
    )?;

    if hermitian {
        let ltens = mpo
            .local_tensors()
            .iter()
            .map(hermitize_ltens)
            .collect::<Vec<_>>();
        mpo = MPArray::new(ltens)?;
    }
    if normalized {
        let norm = mpo.norm();
        mpo.div_real_inplace(norm);
    }
    Ok(mpo)
}

/// [`random_mpo`] drawing from the thread-local generator
pub fn random_mpo_default<K: Into<RankSpec>>(
    sites: usize,
    ldim: usize,
    rank: K,
    hermitian: bool,
    normalized: bool,
    force_rank: bool,
) -> Result<MPArray<Complex64>> {
    random_mpo(&mut rand::thread_rng(), sites, ldim, rank, hermitian, normalized, force_rank)
}

/// `l + swap(l)^H` on one `(l, d, d, r)` block
fn hermitize_ltens(t: &LocalTensor<Complex64>) -> LocalTensor<Complex64> {
    let dims = t.dims();
    let (l, r) = (dims[0], dims[3]);
    let d = dims[1];
    let data = t.data();
    let mut out = vec![Complex64::new(0.0, 0.0); data.len()];
    for l_i in 0..l {
        for dr in 0..d {
            for dc in 0..d {
                for r_i in 0..r {
                    out[((l_i * d + dr) * d + dc) * r + r_i] = data
                        [((l_i * d + dr) * d + dc) * r + r_i]
                        + data[((l_i * d + dc) * d + dr) * r + r_i].conj();
                }
            }
        }
    }
    local_from_data(out, &dims)
}

/// Random normalized matrix-product state
pub fn random_mps<R: Rng, K: Into<RankSpec>>(
    rng: &mut R,
    sites: usize,
    ldim: usize,
    rank: K,
    force_rank: bool,
) -> Result<MPArray<Complex64>> {
    random_mpa::<Complex64, _, _, _>(rng, sites, ldim, rank, true, force_rank)
}

/// [`random_mps`] drawing from the thread-local generator
pub fn random_mps_default<K: Into<RankSpec>>(
    sites: usize,
    ldim: usize,
    rank: K,
    force_rank: bool,
) -> Result<MPArray<Complex64>> {
    random_mps(&mut rand::thread_rng(), sites, ldim, rank, force_rank)
}

/// Random matrix-product density operator: positive semidefinite, trace 1
///
/// Built as a mixture of `rank` pure product-structure states with weights
/// drawn uniformly and normalized to the simplex. The gauge at every internal
/// bond is then scrambled with a fresh Haar unitary and its inverse, so the
/// mixture structure is no longer apparent while the represented operator is
/// unchanged. The bond rank is exactly `rank`.
pub fn random_mpdo<R: Rng>(
    rng: &mut R,
    sites: usize,
    ldim: usize,
    rank: usize,
) -> Result<MPArray<Complex64>> {
    if rank == 0 {
        return Err(RandomError::BadDimension {
            what: "rank",
            value: 0,
        });
    }

    let psis: Vec<MPArray<Complex64>> = (0..rank)
        .map(|_| random_mps(rng, sites, ldim, 1, false))
        .collect::<Result<_>>()?;
    let weights: Vec<f64> = (0..rank).map(|_| rng.gen::<f64>()).collect();
    let total: f64 = weights.iter().sum();

    let terms: Vec<MPArray<Complex64>> = psis
        .iter()
        .zip(&weights)
        .map(|(psi, &w)| Ok(mps_to_mpo(psi)?.scaled(Complex64::from_f64(w / total))))
        .collect::<Result<_>>()?;
    let mut rho = MPArray::sumup(&terms)?;

    // Scramble the gauge at every internal bond; U U^H cancels on the bond
    let ranks = rho.ranks();
    for (n, &r) in ranks.iter().enumerate() {
        let u = haar_unitary(rng, r)?;
        let u_dag = DTensor::<Complex64, 2>::from_fn([r, r], |idx| u[[idx[1], idx[0]]].conj());
        let scrambled_left = rho.lt(n).mul_right_matrix(&u);
        rho.set_lt(n, scrambled_left)?;
        let scrambled_right = rho.lt(n + 1).mul_left_matrix(&u_dag);
        rho.set_lt(n + 1, scrambled_right)?;
    }

    let tr = rho.trace()?;
    rho.div_real_inplace(tr.re);
    Ok(rho)
}

/// [`random_mpdo`] drawing from the thread-local generator
pub fn random_mpdo_default(sites: usize, ldim: usize, rank: usize) -> Result<MPArray<Complex64>> {
    random_mpdo(&mut rand::thread_rng(), sites, ldim, rank)
}

/// Random Hamiltonian that is a sum of local interaction terms
///
/// Each of the `sites + 1 - intlen` terms is an independent Hermitian
/// unit-norm operator on `intlen` consecutive sites, embedded with identities
/// elsewhere and slid by one site per term.
pub fn random_local_ham<R: Rng>(
    rng: &mut R,
    sites: usize,
    ldim: usize,
    intlen: usize,
) -> Result<MPArray<Complex64>> {
    if intlen == 0 {
        return Err(RandomError::BadDimension {
            what: "intlen",
            value: 0,
        });
    }
    if sites < intlen {
        return Err(RandomError::InteractionTooLong { sites, intlen });
    }

    let terms: Vec<MPArray<Complex64>> = (0..sites + 1 - intlen)
        .map(|_| {
            let op = random_op::<Complex64, R>(rng, intlen, ldim, true, true)?;
            let local = global_to_local(&op, intlen)?;
            Ok(MPArray::from_array(&local, 2)?)
        })
        .collect::<Result<_>>()?;
    Ok(MPArray::local_sum(&terms)?)
}

/// [`random_local_ham`] drawing from the thread-local generator
pub fn random_local_ham_default(
    sites: usize,
    ldim: usize,
    intlen: usize,
) -> Result<MPArray<Complex64>> {
    random_local_ham(&mut rand::thread_rng(), sites, ldim, intlen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::ComplexFloat;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_zero_forced_rank() {
        let mpa = zero::<f64, _, _>(4, 2, 10, true).unwrap();
        assert_eq!(mpa.ranks(), vec![10, 10, 10]);
        assert_eq!(mpa.shape(), vec![vec![2]; 4]);
        for site in 0..4 {
            assert!(mpa.lt(site).data().iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_random_mpa_ranks_capped() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mpa = random_mpa::<f64, _, _, _>(&mut rng, 4, 2, 10, false, false).unwrap();
        assert_eq!(mpa.ranks(), vec![2, 4, 2]);
    }

    #[test]
    fn test_random_mpa_normalized() {
        let mut rng = ChaCha8Rng::seed_from_u64(43);
        let mpa = random_mpa::<Complex64, _, _, _>(&mut rng, 3, 2, 3, true, false).unwrap();
        assert!((mpa.norm() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_eye_materializes_identity() {
        let mpa = eye::<Complex64>(3, 2).unwrap();
        assert_eq!(mpa.ranks(), vec![1, 1]);
        let m = mpa.to_matrix().unwrap();
        for i in 0..8 {
            for j in 0..8 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((m[[i, j]] - expect).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_eye_per_site_shape() {
        let mpa = eye_per_site::<f64>(&[3, 4, 5]).unwrap();
        assert_eq!(
            mpa.shape(),
            vec![vec![3, 3], vec![4, 4], vec![5, 5]]
        );
    }

    #[test]
    fn test_diagonal_mpa_two_sites() {
        let entries = [1.0, 2.0, 3.0];
        let mpa = diagonal_mpa(&entries, 2).unwrap();
        assert_eq!(mpa.ranks(), vec![3]);
        assert_eq!(mpa.canonical_form(), (1, 2));
        let arr = mpa.to_array();
        assert_eq!(arr.dims(), vec![3, 3]);
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { entries[i] } else { 0.0 };
                assert!((arr.data()[i * 3 + j] - expect).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_diagonal_mpa_single_site() {
        let entries = [4.0, 5.0];
        let mpa = diagonal_mpa(&entries, 1).unwrap();
        assert_eq!(mpa.len(), 1);
        assert_eq!(mpa.to_array().data(), &entries[..]);
    }

    #[test]
    fn test_diagonal_mpa_three_sites() {
        let entries = [1.0, -2.0];
        let mpa = diagonal_mpa(&entries, 3).unwrap();
        let arr = mpa.to_array();
        assert_eq!(arr.dims(), vec![2, 2, 2]);
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    let expect = if i == j && j == k { entries[i] } else { 0.0 };
                    assert!((arr.data()[(i * 2 + j) * 2 + k] - expect).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_random_mps_normalized() {
        let mut rng = ChaCha8Rng::seed_from_u64(44);
        let mps = random_mps(&mut rng, 4, 2, 10, true).unwrap();
        assert_eq!(mps.ranks(), vec![10, 10, 10]);
        let ip = MPArray::inner(&mps, &mps).unwrap();
        assert!((ip - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_random_mpo_normalized() {
        let mut rng = ChaCha8Rng::seed_from_u64(45);
        let mpo = random_mpo(&mut rng, 3, 2, 4, false, true, false).unwrap();
        assert_eq!(mpo.shape(), vec![vec![2, 2]; 3]);
        assert!((mpo.norm() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_random_mpo_single_site_hermitian() {
        // For one site the local symmetrization is exactly global Hermiticity
        let mut rng = ChaCha8Rng::seed_from_u64(46);
        let mpo = random_mpo(&mut rng, 1, 3, 1, true, false, false).unwrap();
        let m = mpo.to_matrix().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert!((m[[i, j]] - m[[j, i]].conj()).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_random_mpo_local_hermitian_blocks() {
        let mut rng = ChaCha8Rng::seed_from_u64(47);
        let mpo = random_mpo(&mut rng, 3, 2, 2, true, false, false).unwrap();
        for site in 0..3 {
            let t = mpo.lt(site);
            let dims = t.dims();
            let (l, d, r) = (dims[0], dims[1], dims[3]);
            let data = t.data();
            for l_i in 0..l {
                for dr in 0..d {
                    for dc in 0..d {
                        for r_i in 0..r {
                            let a = data[((l_i * d + dr) * d + dc) * r + r_i];
                            let b = data[((l_i * d + dc) * d + dr) * r + r_i];
                            assert!((a - b.conj()).norm() < 1e-12);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_random_mpdo_trace_and_rank() {
        let mut rng = ChaCha8Rng::seed_from_u64(48);
        let rho = random_mpdo(&mut rng, 4, 2, 3).unwrap();
        assert_eq!(rho.ranks(), vec![3, 3, 3]);
        assert_eq!(rho.shape(), vec![vec![2, 2]; 4]);
        let tr = rho.trace().unwrap();
        assert!((tr - 1.0).norm() < 1e-10);
    }

    #[test]
    fn test_random_mpdo_positive_semidefinite() {
        let mut rng = ChaCha8Rng::seed_from_u64(49);
        let rho = random_mpdo(&mut rng, 3, 2, 2).unwrap();
        let m = rho.to_matrix().unwrap();
        let n = 8;

        // Hermitian as a dense matrix
        for i in 0..n {
            for j in 0..n {
                assert!((m[[i, j]] - m[[j, i]].conj()).norm() < 1e-10);
            }
        }
        // Quadratic forms with random probes are nonnegative
        for _ in 0..50 {
            let v: Vec<Complex64> = (0..n)
                .map(|_| Complex64::standard_normal(&mut rng))
                .collect();
            let mut quad = Complex64::new(0.0, 0.0);
            for i in 0..n {
                for j in 0..n {
                    quad += v[i].conj() * m[[i, j]] * v[j];
                }
            }
            assert!(quad.re > -1e-10);
        }
    }

    #[test]
    fn test_random_mpdo_scrambling_preserves_operator() {
        // Trace of rho^2 is basis independent; compare against the purity of
        // the represented mixture through the dense matrix
        let mut rng = ChaCha8Rng::seed_from_u64(50);
        let rho = random_mpdo(&mut rng, 2, 2, 2).unwrap();
        let m = rho.to_matrix().unwrap();
        let mut tr = Complex64::new(0.0, 0.0);
        for i in 0..4 {
            tr += m[[i, i]];
        }
        assert!((tr - 1.0).norm() < 1e-10);
    }

    #[test]
    fn test_random_local_ham_hermitian() {
        let mut rng = ChaCha8Rng::seed_from_u64(51);
        let ham = random_local_ham(&mut rng, 5, 2, 2).unwrap();
        assert_eq!(ham.len(), 5);
        assert_eq!(ham.shape(), vec![vec![2, 2]; 5]);
        let m = ham.to_matrix().unwrap();
        let n = 32;
        for i in 0..n {
            for j in 0..n {
                assert!((m[[i, j]] - m[[j, i]].conj()).norm() < 1e-10);
            }
        }
    }

    #[test]
    fn test_random_local_ham_term_count_via_rank() {
        // 4 two-site terms on 5 sites: the direct sum of 4 rank<=4 terms
        let mut rng = ChaCha8Rng::seed_from_u64(52);
        let ham = random_local_ham(&mut rng, 5, 2, 2).unwrap();
        assert_eq!(ham.ranks().len(), 4);
    }

    #[test]
    fn test_default_generator_wrappers() {
        // Order-dependent but structurally deterministic
        let mps = random_mps_default(3, 2, 2, true).unwrap();
        assert_eq!(mps.ranks(), vec![2, 2]);
        let ip = MPArray::inner(&mps, &mps).unwrap();
        assert!((ip - 1.0).abs() < 1e-10);

        let u = crate::haar::haar_unitary_default(3).unwrap();
        assert_eq!(u.dim(0), 3);
    }

    #[test]
    fn test_random_local_ham_requires_enough_sites() {
        let mut rng = ChaCha8Rng::seed_from_u64(53);
        let err = random_local_ham(&mut rng, 2, 2, 3).unwrap_err();
        assert!(matches!(err, RandomError::InteractionTooLong { .. }));
    }
}

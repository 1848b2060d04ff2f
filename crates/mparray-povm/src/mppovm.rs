//! Multipartite POVMs in matrix-product form
//!
//! A measurement device over `w` sites is stored as a chain whose local
//! tensors carry three physical legs `(outcome, row, column)`. Slicing the
//! outcome leg on every site yields the operator of one joint outcome; the
//! derived probability map contracts vectorized reduced states directly into
//! outcome probabilities.

use mparray_core::{
    local_from_data, reductions_mpo, LocalTensorOps, MPArray, PaxisIter, Reductions,
};
use num_complex::Complex64;

use crate::error::{PovmError, Result};
use crate::localpovm::LocalPovm;

/// Matrix-product representation of a multipartite POVM
///
/// Wraps a chain with three physical legs per site; the wrapped chain is
/// immutable through this type.
#[derive(Debug, Clone)]
pub struct MPPovm {
    mpa: MPArray<Complex64>,
}

impl MPPovm {
    /// Wrap a chain as a measurement device
    ///
    /// Every site must carry exactly three physical legs
    /// `(outcome, row, column)`.
    pub fn new(mpa: MPArray<Complex64>) -> Result<Self> {
        for site in 0..mpa.len() {
            let legs = mpa.num_legs(site);
            if legs != 3 {
                return Err(PovmError::DataShape {
                    message: format!("site {} has {} physical legs, expected 3", site, legs),
                });
            }
        }
        Ok(Self { mpa })
    }

    /// Product device repeating one local POVM on `width` sites
    pub fn from_local_povm(local: &LocalPovm, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(PovmError::DataShape {
                message: "device must cover at least one site".to_string(),
            });
        }
        let factors = vec![local.outcome_tensor(); width];
        Ok(Self::new(MPArray::from_kron(&factors)?)?)
    }

    /// Number of sites the device covers
    pub fn len(&self) -> usize {
        self.mpa.len()
    }

    /// Always false; devices cover at least one site
    pub fn is_empty(&self) -> bool {
        self.mpa.is_empty()
    }

    /// Outcome-leg dimension at every site
    pub fn outcome_dims(&self) -> Vec<usize> {
        (0..self.mpa.len())
            .map(|site| self.mpa.lt(site).phys_dims()[0])
            .collect()
    }

    /// The backing chain
    pub fn mpa(&self) -> &MPArray<Complex64> {
        &self.mpa
    }

    /// Restartable iterator over all joint-outcome operators
    ///
    /// The i-th element is the operator of the i-th joint outcome in
    /// row-major outcome order (last site fastest), in standard paired-leg
    /// operator form.
    pub fn outcomes(&self) -> Result<PaxisIter<'_, Complex64>> {
        Ok(self.mpa.paxis_iter(0)?)
    }

    /// The linear map from vectorized density matrices to outcome
    /// probabilities
    ///
    /// Each `(l, outcome, row, column, r)` block is reshaped to
    /// `(l, outcome, row * column, r)` and conjugated. A pure function of the
    /// device: repeated calls yield identical tensors.
    pub fn probability_map(&self) -> Result<MPArray<Complex64>> {
        let ltens = (0..self.mpa.len())
            .map(|site| {
                let t = self.mpa.lt(site);
                let dims = t.dims();
                let (l, o, row, col, r) = (dims[0], dims[1], dims[2], dims[3], dims[4]);
                let data: Vec<Complex64> = t.data().iter().map(|x| x.conj()).collect();
                local_from_data(data, &[l, o, row * col, r])
            })
            .collect();
        Ok(MPArray::new(ltens)?)
    }

    /// Sliding-window expectation values against a mixed-state host
    ///
    /// For every window position `n` the reduced state on sites
    /// `[n, n + len)` is contracted against the probability map; the n-th
    /// yielded value is the outcome-probability chain for that window. The
    /// sequence is lazy and consumed once; call again to re-derive it.
    ///
    /// Hosts with one physical leg per site (pure states) are not supported
    /// yet; any other leg count is rejected as not understood.
    pub fn expectations<'a>(&self, host: &'a MPArray<Complex64>) -> Result<Expectations<'a>> {
        let legs: Vec<usize> = (0..host.len()).map(|site| host.num_legs(site)).collect();

        if legs.iter().all(|&p| p == 1) {
            return Err(PovmError::NotSupported {
                message: "expectation values for pure-state (MPS) hosts".to_string(),
            });
        }
        if !legs.iter().all(|&p| p == 2) {
            return Err(PovmError::DataShape {
                message: format!("host physical legs {:?}", legs),
            });
        }
        if host.len() < self.len() {
            return Err(PovmError::HostTooShort {
                host: host.len(),
                width: self.len(),
            });
        }

        Ok(Expectations {
            pmap: self.probability_map()?,
            reductions: reductions_mpo(host, self.len())?,
        })
    }
}

/// Lazy iterator of per-window outcome-probability chains
///
/// Returned by [`MPPovm::expectations`]; yields one value per window in
/// increasing window-start order. Stopping early never computes later
/// windows.
#[derive(Debug)]
pub struct Expectations<'a> {
    pmap: MPArray<Complex64>,
    reductions: Reductions<'a, Complex64>,
}

impl Iterator for Expectations<'_> {
    type Item = Result<MPArray<Complex64>>;

    fn next(&mut self) -> Option<Self::Item> {
        let rho = self.reductions.next()?;
        let probs = MPArray::dot(&self.pmap, &rho.ravel()).map_err(PovmError::from);
        Some(probs)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.reductions.size_hint()
    }
}

//! Matrix-product array container
//!
//! An `MPArray` is an ordered chain of local tensors, each with one left bond
//! axis, zero or more physical axes and one right bond axis. Adjacent bond
//! dimensions must match and the outer bonds have dimension 1.

use mdarray::DTensor;

use crate::error::{CoreError, Result};
use crate::linalg::qr_thin;
use crate::types::{local_from_data, strides_of, LocalTensor, LocalTensorOps, Scalar};
use crate::utils::local_to_global;

/// Matrix-product array with a canonical-form marker
///
/// The canonical form `(l, r)` records that sites `[0, l)` are in the
/// left-orthogonal gauge and sites `[r, len)` in the right-orthogonal gauge.
/// It is bookkeeping only; nothing here recomputes gauges.
#[derive(Debug, Clone)]
pub struct MPArray<T: Scalar> {
    ltens: Vec<LocalTensor<T>>,
    cform: (usize, usize),
}

impl<T: Scalar> MPArray<T> {
    /// Create a new matrix-product array from a chain of local tensors
    pub fn new(ltens: Vec<LocalTensor<T>>) -> Result<Self> {
        let len = ltens.len();
        Self::with_canonical_form(ltens, (0, len))
    }

    /// Create a matrix-product array with an explicit canonical-form marker
    pub fn with_canonical_form(ltens: Vec<LocalTensor<T>>, cform: (usize, usize)) -> Result<Self> {
        if ltens.is_empty() {
            return Err(CoreError::Empty);
        }
        for (site, t) in ltens.iter().enumerate() {
            if t.rank() < 2 {
                return Err(CoreError::InvalidOperation {
                    message: format!("local tensor at site {} has rank {} < 2", site, t.rank()),
                });
            }
        }
        let left = ltens[0].left_dim();
        if left != 1 {
            return Err(CoreError::BadBoundary { side: "left", rank: left });
        }
        let right = ltens[ltens.len() - 1].right_dim();
        if right != 1 {
            return Err(CoreError::BadBoundary { side: "right", rank: right });
        }
        for site in 0..ltens.len() - 1 {
            let r = ltens[site].right_dim();
            let l = ltens[site + 1].left_dim();
            if r != l {
                return Err(CoreError::BondMismatch { site, right: r, left: l });
            }
        }
        if cform.0 > cform.1 || cform.1 > ltens.len() {
            return Err(CoreError::InvalidOperation {
                message: format!("invalid canonical form {:?} for {} sites", cform, ltens.len()),
            });
        }
        Ok(Self { ltens, cform })
    }

    /// Construct from tensors whose dimensions are already known to be valid
    pub(crate) fn from_tensors_unchecked(ltens: Vec<LocalTensor<T>>) -> Self {
        let len = ltens.len();
        Self { ltens, cform: (0, len) }
    }

    /// Build a rank-1 product chain from per-site factors
    ///
    /// Each factor contributes one site; a factor with dims `(d_1, .., d_k)`
    /// becomes the local tensor `(1, d_1, .., d_k, 1)`.
    pub fn from_kron(factors: &[LocalTensor<T>]) -> Result<Self> {
        if factors.is_empty() {
            return Err(CoreError::Empty);
        }
        let ltens = factors
            .iter()
            .map(|f| {
                let mut dims = vec![1];
                dims.extend(f.dims());
                dims.push(1);
                local_from_data(f.data().to_vec(), &dims)
            })
            .collect();
        Self::new(ltens)
    }

    /// Build an exact matrix-product array from one dense array
    ///
    /// `array` must be in site-local axis order with `ndims` legs per site.
    /// Successive thin-QR splits produce a left-canonical chain with
    /// canonical form `(sites - 1, sites)`.
    pub fn from_array(array: &LocalTensor<T>, ndims: usize) -> Result<Self> {
        if ndims == 0 || array.rank() == 0 || array.rank() % ndims != 0 {
            return Err(CoreError::InvalidOperation {
                message: format!(
                    "array rank {} is not a positive multiple of {} legs per site",
                    array.rank(),
                    ndims
                ),
            });
        }
        let sites = array.rank() / ndims;
        let dims = array.dims();

        let mut data: Vec<T> = array.data().to_vec();
        let mut bond = 1usize;
        let mut tail: usize = dims.iter().product();
        let mut ltens = Vec::with_capacity(sites);

        for n in 0..sites {
            let site_dims = &dims[n * ndims..(n + 1) * ndims];
            let site_size: usize = site_dims.iter().product();
            tail /= site_size;

            let mut shape = Vec::with_capacity(ndims + 2);
            shape.push(bond);
            shape.extend_from_slice(site_dims);

            if n == sites - 1 {
                shape.push(1);
                ltens.push(local_from_data(data.clone(), &shape));
            } else {
                let m = bond * site_size;
                let mut mat = DTensor::<T, 2>::from_fn([m, tail], |idx| data[idx[0] * tail + idx[1]]);
                let (q, r) = qr_thin(mat.as_mut());
                let k = q.dim(1);

                let mut q_data = Vec::with_capacity(m * k);
                for i in 0..m {
                    for j in 0..k {
                        q_data.push(q[[i, j]]);
                    }
                }
                shape.push(k);
                ltens.push(local_from_data(q_data, &shape));

                let mut r_data = Vec::with_capacity(k * tail);
                for i in 0..k {
                    for j in 0..tail {
                        r_data.push(r[[i, j]]);
                    }
                }
                data = r_data;
                bond = k;
            }
        }

        Self::with_canonical_form(ltens, (sites - 1, sites))
    }

    /// Number of sites
    pub fn len(&self) -> usize {
        self.ltens.len()
    }

    /// Always false; chains have at least one site
    pub fn is_empty(&self) -> bool {
        self.ltens.is_empty()
    }

    /// Canonical-form marker
    pub fn canonical_form(&self) -> (usize, usize) {
        self.cform
    }

    /// The local tensor at `site`
    pub fn lt(&self, site: usize) -> &LocalTensor<T> {
        &self.ltens[site]
    }

    /// All local tensors in site order
    pub fn local_tensors(&self) -> &[LocalTensor<T>] {
        &self.ltens
    }

    /// Replace the local tensor at `site`
    ///
    /// The replacement must keep both bond dimensions compatible with the
    /// neighbors. The canonical-form marker is reset since the gauge of the
    /// new tensor is unknown.
    pub fn set_lt(&mut self, site: usize, tensor: LocalTensor<T>) -> Result<()> {
        let expected_left = if site == 0 { 1 } else { self.ltens[site - 1].right_dim() };
        let expected_right = if site == self.len() - 1 {
            1
        } else {
            self.ltens[site + 1].left_dim()
        };
        if tensor.left_dim() != expected_left {
            return Err(CoreError::BondMismatch {
                site: site.saturating_sub(1),
                right: expected_left,
                left: tensor.left_dim(),
            });
        }
        if tensor.right_dim() != expected_right {
            return Err(CoreError::BondMismatch {
                site,
                right: tensor.right_dim(),
                left: expected_right,
            });
        }
        self.ltens[site] = tensor;
        self.cform = (0, self.len());
        Ok(())
    }

    /// Bond dimensions along the chain, length `len - 1`
    pub fn ranks(&self) -> Vec<usize> {
        (1..self.len()).map(|i| self.ltens[i].left_dim()).collect()
    }

    /// Per-site physical dimensions
    pub fn shape(&self) -> Vec<Vec<usize>> {
        self.ltens.iter().map(|t| t.phys_dims()).collect()
    }

    /// Number of physical legs at `site`
    pub fn num_legs(&self, site: usize) -> usize {
        self.ltens[site].num_legs()
    }

    /// The common physical-leg count, if every site agrees
    pub fn uniform_num_legs(&self) -> Option<usize> {
        let first = self.ltens[0].num_legs();
        self.ltens[1..]
            .iter()
            .all(|t| t.num_legs() == first)
            .then_some(first)
    }

    /// Multiply by a scalar (absorbed into the last tensor)
    pub fn scale(&mut self, factor: T) {
        let last = self.ltens.len() - 1;
        let t = &self.ltens[last];
        let data: Vec<T> = t.data().iter().map(|&x| x * factor).collect();
        let dims = t.dims();
        self.ltens[last] = local_from_data(data, &dims);
    }

    /// A scaled copy
    pub fn scaled(&self, factor: T) -> Self {
        let mut out = self.clone();
        out.scale(factor);
        out
    }

    /// Divide by a real scalar in place
    pub fn div_real_inplace(&mut self, x: f64) {
        self.scale(T::from_f64(1.0 / x));
    }

    /// Inner product `<a, b>`, conjugate-linear in `a`
    ///
    /// Both chains are read as vectors over all physical indices.
    pub fn inner(a: &Self, b: &Self) -> Result<T> {
        if a.len() != b.len() {
            return Err(CoreError::LengthMismatch {
                what: "sites",
                expected: a.len(),
                got: b.len(),
            });
        }

        // Transfer matrix env[ra * rb_dim + rb], starting from the 1x1 identity
        let mut env = vec![T::one()];
        let mut ra_dim = 1usize;
        let mut rb_dim = 1usize;

        for site in 0..a.len() {
            let ta = &a.ltens[site];
            let tb = &b.ltens[site];
            let p = ta.phys_size();
            if p != tb.phys_size() {
                return Err(CoreError::InvalidOperation {
                    message: format!(
                        "physical size mismatch at site {}: {} vs {}",
                        site,
                        p,
                        tb.phys_size()
                    ),
                });
            }
            let (la, ra) = (ta.left_dim(), ta.right_dim());
            let (lb, rb) = (tb.left_dim(), tb.right_dim());
            debug_assert_eq!(la, ra_dim);
            debug_assert_eq!(lb, rb_dim);
            let da = ta.data();
            let db = tb.data();

            let mut next = vec![T::zero(); ra * rb];
            for la_i in 0..la {
                for lb_i in 0..lb {
                    let e = env[la_i * lb + lb_i];
                    if e == T::zero() {
                        continue;
                    }
                    for p_i in 0..p {
                        for ra_i in 0..ra {
                            let av = da[(la_i * p + p_i) * ra + ra_i].conj();
                            if av == T::zero() {
                                continue;
                            }
                            for rb_i in 0..rb {
                                next[ra_i * rb + rb_i] = next[ra_i * rb + rb_i]
                                    + e * av * db[(lb_i * p + p_i) * rb + rb_i];
                            }
                        }
                    }
                }
            }
            env = next;
            ra_dim = ra;
            rb_dim = rb;
        }

        Ok(env[0])
    }

    /// Euclidean norm over all physical indices
    pub fn norm(&self) -> f64 {
        // Inner product of a chain with itself cannot fail and is real
        match Self::inner(self, self) {
            Ok(x) => x.re().max(0.0).sqrt(),
            Err(_) => 0.0,
        }
    }

    /// Trace of a 2-leg (operator) chain
    pub fn trace(&self) -> Result<T> {
        let mut env = vec![T::one()];
        for (site, t) in self.ltens.iter().enumerate() {
            let m = traced_site(t, site)?;
            let l = t.left_dim();
            let r = t.right_dim();
            let mut next = vec![T::zero(); r];
            for r_i in 0..r {
                let mut acc = T::zero();
                for l_i in 0..l {
                    acc = acc + env[l_i] * m[l_i * r + r_i];
                }
                next[r_i] = acc;
            }
            env = next;
        }
        Ok(env[0])
    }

    /// Sum over all physical indices
    pub fn sum(&self) -> T {
        let mut env = vec![T::one()];
        for t in &self.ltens {
            let l = t.left_dim();
            let r = t.right_dim();
            let p = t.phys_size();
            let data = t.data();
            let mut next = vec![T::zero(); r];
            for l_i in 0..l {
                let e = env[l_i];
                for p_i in 0..p {
                    for r_i in 0..r {
                        next[r_i] = next[r_i] + e * data[(l_i * p + p_i) * r + r_i];
                    }
                }
            }
            env = next;
        }
        env[0]
    }

    /// Site-wise contraction of the last physical leg of `a` with the first
    /// physical leg of `b`
    ///
    /// The result carries the remaining legs of `a` followed by the remaining
    /// legs of `b` at each site; bond dimensions multiply.
    pub fn dot(a: &Self, b: &Self) -> Result<Self> {
        if a.len() != b.len() {
            return Err(CoreError::LengthMismatch {
                what: "sites",
                expected: a.len(),
                got: b.len(),
            });
        }

        let mut ltens = Vec::with_capacity(a.len());
        for site in 0..a.len() {
            let ta = &a.ltens[site];
            let tb = &b.ltens[site];
            if ta.num_legs() == 0 || tb.num_legs() == 0 {
                return Err(CoreError::LegCountMismatch {
                    site,
                    expected: 1,
                    got: 0,
                });
            }
            let da = ta.dims();
            let db = tb.dims();
            let x = da[da.len() - 2];
            if x != db[1] {
                return Err(CoreError::InvalidOperation {
                    message: format!(
                        "contracted leg mismatch at site {}: {} vs {}",
                        site, x, db[1]
                    ),
                });
            }

            let la = da[0];
            let ra = da[da.len() - 1];
            let pa: usize = da[1..da.len() - 2].iter().product();
            let lb = db[0];
            let rb = db[db.len() - 1];
            let pb: usize = db[2..db.len() - 1].iter().product();

            let sa = ta.data();
            let sb = tb.data();
            let mut out = vec![T::zero(); la * lb * pa * pb * ra * rb];
            // out[(((la lb), pa, pb, (ra rb))] row-major
            for la_i in 0..la {
                for lb_i in 0..lb {
                    for pa_i in 0..pa {
                        for pb_i in 0..pb {
                            for ra_i in 0..ra {
                                for rb_i in 0..rb {
                                    let mut acc = T::zero();
                                    for x_i in 0..x {
                                        let av = sa[((la_i * pa + pa_i) * x + x_i) * ra + ra_i];
                                        let bv = sb[((lb_i * x + x_i) * pb + pb_i) * rb + rb_i];
                                        acc = acc + av * bv;
                                    }
                                    let o = ((((la_i * lb + lb_i) * pa + pa_i) * pb + pb_i) * ra
                                        + ra_i)
                                        * rb
                                        + rb_i;
                                    out[o] = out[o] + acc;
                                }
                            }
                        }
                    }
                }
            }

            let mut dims = vec![la * lb];
            dims.extend_from_slice(&da[1..da.len() - 2]);
            dims.extend_from_slice(&db[2..db.len() - 1]);
            dims.push(ra * rb);
            ltens.push(local_from_data(out, &dims));
        }

        Ok(Self::from_tensors_unchecked(ltens))
    }

    /// Flatten the physical legs of every site into a single leg
    pub fn ravel(&self) -> Self {
        let ltens = self
            .ltens
            .iter()
            .map(|t| {
                let dims = [t.left_dim(), t.phys_size(), t.right_dim()];
                local_from_data(t.data().to_vec(), &dims)
            })
            .collect();
        Self {
            ltens,
            cform: self.cform,
        }
    }

    /// Restartable iterator over one physical axis of every site
    ///
    /// Yields one sub-chain per joint index combination, with the given axis
    /// fixed on every site; the last site varies fastest.
    pub fn paxis_iter(&self, axis: usize) -> Result<PaxisIter<'_, T>> {
        let mut axis_dims = Vec::with_capacity(self.len());
        for (site, t) in self.ltens.iter().enumerate() {
            let phys = t.phys_dims();
            if axis >= phys.len() {
                return Err(CoreError::LegCountMismatch {
                    site,
                    expected: axis + 1,
                    got: phys.len(),
                });
            }
            axis_dims.push(phys[axis]);
        }
        Ok(PaxisIter {
            mpa: self,
            axis,
            counter: vec![0; self.len()],
            axis_dims,
            done: false,
        })
    }

    /// Materialize the chain as a dense array in site-local axis order
    ///
    /// This is exponential in the number of sites; intended for small chains
    /// and tests.
    pub fn to_array(&self) -> LocalTensor<T> {
        let out_dims: Vec<usize> = self.ltens.iter().flat_map(|t| t.phys_dims()).collect();
        let psizes: Vec<usize> = self.ltens.iter().map(|t| t.phys_size()).collect();
        let total: usize = psizes.iter().product();

        let mut out = Vec::with_capacity(total);
        let mut idx = vec![0usize; self.len()];
        loop {
            out.push(self.eval_flat(&idx));

            let mut carry = true;
            for site in (0..self.len()).rev() {
                if carry {
                    idx[site] += 1;
                    if idx[site] >= psizes[site] {
                        idx[site] = 0;
                    } else {
                        carry = false;
                    }
                }
            }
            if carry {
                break;
            }
        }
        local_from_data(out, &out_dims)
    }

    /// Materialize a 2-leg (operator) chain as a dense matrix
    ///
    /// Rows collect the first leg of every site, columns the second.
    pub fn to_matrix(&self) -> Result<DTensor<T, 2>> {
        let mut rows = 1usize;
        let mut cols = 1usize;
        for (site, t) in self.ltens.iter().enumerate() {
            let phys = t.phys_dims();
            if phys.len() != 2 {
                return Err(CoreError::LegCountMismatch {
                    site,
                    expected: 2,
                    got: phys.len(),
                });
            }
            rows *= phys[0];
            cols *= phys[1];
        }

        let arr = self.to_array();
        let global = local_to_global(&arr, self.len())?;
        let data = global.data();
        Ok(DTensor::<T, 2>::from_fn([rows, cols], |idx| {
            data[idx[0] * cols + idx[1]]
        }))
    }

    /// Evaluate the chain with one flattened physical index per site
    fn eval_flat(&self, idx: &[usize]) -> T {
        let mut env = vec![T::one()];
        for (site, t) in self.ltens.iter().enumerate() {
            let l = t.left_dim();
            let r = t.right_dim();
            let p = t.phys_size();
            let data = t.data();
            let p_i = idx[site];
            let mut next = vec![T::zero(); r];
            for r_i in 0..r {
                let mut acc = T::zero();
                for l_i in 0..l {
                    acc = acc + env[l_i] * data[(l_i * p + p_i) * r + r_i];
                }
                next[r_i] = acc;
            }
            env = next;
        }
        env[0]
    }
}

/// Sum out the paired physical legs of one site, leaving an `l x r` matrix
pub(crate) fn traced_site<T: Scalar>(t: &LocalTensor<T>, site: usize) -> Result<Vec<T>> {
    let phys = t.phys_dims();
    if phys.len() != 2 {
        return Err(CoreError::LegCountMismatch {
            site,
            expected: 2,
            got: phys.len(),
        });
    }
    if phys[0] != phys[1] {
        return Err(CoreError::InvalidOperation {
            message: format!(
                "cannot trace non-square legs ({}, {}) at site {}",
                phys[0], phys[1], site
            ),
        });
    }
    let d = phys[0];
    let l = t.left_dim();
    let r = t.right_dim();
    let data = t.data();
    let mut m = vec![T::zero(); l * r];
    for l_i in 0..l {
        for d_i in 0..d {
            for r_i in 0..r {
                m[l_i * r + r_i] =
                    m[l_i * r + r_i] + data[((l_i * d + d_i) * d + d_i) * r + r_i];
            }
        }
    }
    Ok(m)
}

/// Maximum sensible bond dimension at every cut of the given physical shape
///
/// At each bond this is the smaller of the physical-dimension products on the
/// two sides; a larger bond carries redundant information.
pub fn full_rank(shape: &[Vec<usize>]) -> Vec<usize> {
    let site_sizes: Vec<usize> = shape
        .iter()
        .map(|dims| dims.iter().product::<usize>())
        .collect();
    let mut left = Vec::with_capacity(site_sizes.len());
    let mut acc = 1usize;
    for &s in &site_sizes {
        acc = acc.saturating_mul(s);
        left.push(acc);
    }
    let mut right = vec![1usize; site_sizes.len()];
    acc = 1;
    for i in (0..site_sizes.len()).rev() {
        acc = acc.saturating_mul(site_sizes[i]);
        right[i] = acc;
    }
    (0..site_sizes.len().saturating_sub(1))
        .map(|cut| left[cut].min(right[cut + 1]))
        .collect()
}

/// Fix one physical axis of a local tensor at `index`, removing that axis
pub(crate) fn slice_phys_axis<T: Scalar>(
    t: &LocalTensor<T>,
    axis: usize,
    index: usize,
) -> LocalTensor<T> {
    let dims = t.dims();
    let strides = strides_of(&dims);
    let tensor_axis = 1 + axis;

    let mut out_dims = dims.clone();
    out_dims.remove(tensor_axis);
    let mut out_strides = strides.clone();
    out_strides.remove(tensor_axis);

    let out_size: usize = out_dims.iter().product();
    let data = t.data();
    let base = index * strides[tensor_axis];

    let mut out = Vec::with_capacity(out_size);
    let mut idx = vec![0usize; out_dims.len()];
    loop {
        let src: usize = base
            + idx
                .iter()
                .zip(out_strides.iter())
                .map(|(&i, &s)| i * s)
                .sum::<usize>();
        out.push(data[src]);

        let mut carry = true;
        for d in (0..out_dims.len()).rev() {
            if carry {
                idx[d] += 1;
                if idx[d] >= out_dims[d] {
                    idx[d] = 0;
                } else {
                    carry = false;
                }
            }
        }
        if carry {
            break;
        }
    }
    local_from_data(out, &out_dims)
}

/// Iterator returned by [`MPArray::paxis_iter`]
pub struct PaxisIter<'a, T: Scalar> {
    mpa: &'a MPArray<T>,
    axis: usize,
    counter: Vec<usize>,
    axis_dims: Vec<usize>,
    done: bool,
}

impl<T: Scalar> PaxisIter<'_, T> {
    /// Joint index combinations this iterator will yield
    pub fn outcome_count(&self) -> usize {
        self.axis_dims.iter().product()
    }
}

impl<T: Scalar> Iterator for PaxisIter<'_, T> {
    type Item = MPArray<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let ltens: Vec<LocalTensor<T>> = self
            .mpa
            .ltens
            .iter()
            .zip(self.counter.iter())
            .map(|(t, &i)| slice_phys_axis(t, self.axis, i))
            .collect();
        let element = MPArray::from_tensors_unchecked(ltens);

        let mut carry = true;
        for site in (0..self.counter.len()).rev() {
            if carry {
                self.counter[site] += 1;
                if self.counter[site] >= self.axis_dims[site] {
                    self.counter[site] = 0;
                } else {
                    carry = false;
                }
            }
        }
        if carry {
            self.done = true;
        }
        Some(element)
    }
}

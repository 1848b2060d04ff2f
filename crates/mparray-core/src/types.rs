//! Core scalar and local-tensor types

use mdarray::{DTensor, DynRank, Shape, Tensor};
use num_complex::{Complex64, ComplexFloat};
use num_traits::{One, Zero};

/// Scalar trait for matrix-product array elements
///
/// Implemented for `f64` and `Complex64`. The `ComplexFloat` bound provides
/// `conj` and `abs`; `ComplexField` is what the linear-algebra backend needs.
pub trait Scalar:
    ComplexFloat<Real = f64>
    + faer_traits::ComplexField
    + From<f64>
    + Zero
    + One
    + Default
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
{
    /// Lift a real number into the scalar type
    fn from_f64(x: f64) -> Self;

    /// Multiply by a real factor
    fn mul_real(self, x: f64) -> Self;

    /// Squared absolute value
    fn abs_sq(self) -> f64;
}

impl Scalar for f64 {
    fn from_f64(x: f64) -> Self {
        x
    }

    fn mul_real(self, x: f64) -> Self {
        self * x
    }

    fn abs_sq(self) -> f64 {
        self * self
    }
}

impl Scalar for Complex64 {
    fn from_f64(x: f64) -> Self {
        Complex64::new(x, 0.0)
    }

    fn mul_real(self, x: f64) -> Self {
        self * x
    }

    fn abs_sq(self) -> f64 {
        self.norm_sqr()
    }
}

/// A local tensor of a matrix-product array
///
/// Shape is `(rank_left, d_1, ..., d_k, rank_right)` with `k >= 0` physical
/// legs. Stored row-major with dynamic rank.
pub type LocalTensor<T> = Tensor<T, DynRank>;

/// Helper operations on local tensors
pub trait LocalTensorOps<T: Scalar> {
    /// Dimensions as a plain vector
    fn dims(&self) -> Vec<usize>;

    /// Left bond dimension
    fn left_dim(&self) -> usize;

    /// Right bond dimension
    fn right_dim(&self) -> usize;

    /// Physical dimensions (everything between the two bond axes)
    fn phys_dims(&self) -> Vec<usize>;

    /// Number of physical legs
    fn num_legs(&self) -> usize;

    /// Product of the physical dimensions
    fn phys_size(&self) -> usize;

    /// Underlying data in row-major order
    fn data(&self) -> &[T];

    /// Contract the right bond with a matrix: `(l, .., r) * (r, r') -> (l, .., r')`
    fn mul_right_matrix(&self, m: &DTensor<T, 2>) -> LocalTensor<T>;

    /// Contract a matrix with the left bond: `(l', l) * (l, .., r) -> (l', .., r)`
    fn mul_left_matrix(&self, m: &DTensor<T, 2>) -> LocalTensor<T>;
}

impl<T: Scalar> LocalTensorOps<T> for LocalTensor<T> {
    fn dims(&self) -> Vec<usize> {
        self.shape().with_dims(|d| d.to_vec())
    }

    fn left_dim(&self) -> usize {
        self.shape().with_dims(|d| d[0])
    }

    fn right_dim(&self) -> usize {
        self.shape().with_dims(|d| d[d.len() - 1])
    }

    fn phys_dims(&self) -> Vec<usize> {
        self.shape().with_dims(|d| d[1..d.len() - 1].to_vec())
    }

    fn num_legs(&self) -> usize {
        self.rank() - 2
    }

    fn phys_size(&self) -> usize {
        self.shape().with_dims(|d| d[1..d.len() - 1].iter().product())
    }

    fn data(&self) -> &[T] {
        &self[..]
    }

    fn mul_right_matrix(&self, m: &DTensor<T, 2>) -> LocalTensor<T> {
        let dims = self.dims();
        let r = dims[dims.len() - 1];
        assert_eq!(r, m.dim(0), "right bond does not match matrix rows");
        let rows: usize = dims[..dims.len() - 1].iter().product();
        let rp = m.dim(1);

        let data = self.data();
        let mut out = vec![T::zero(); rows * rp];
        for i in 0..rows {
            for k in 0..r {
                let a = data[i * r + k];
                for j in 0..rp {
                    out[i * rp + j] = out[i * rp + j] + a * m[[k, j]];
                }
            }
        }

        let mut new_dims = dims;
        let last = new_dims.len() - 1;
        new_dims[last] = rp;
        local_from_data(out, &new_dims)
    }

    fn mul_left_matrix(&self, m: &DTensor<T, 2>) -> LocalTensor<T> {
        let dims = self.dims();
        let l = dims[0];
        assert_eq!(l, m.dim(1), "left bond does not match matrix columns");
        let cols: usize = dims[1..].iter().product();
        let lp = m.dim(0);

        let data = self.data();
        let mut out = vec![T::zero(); lp * cols];
        for i in 0..lp {
            for k in 0..l {
                let a = m[[i, k]];
                for j in 0..cols {
                    out[i * cols + j] = out[i * cols + j] + a * data[k * cols + j];
                }
            }
        }

        let mut new_dims = dims;
        new_dims[0] = lp;
        local_from_data(out, &new_dims)
    }
}

/// Create a zero-filled local tensor with the given dimensions
pub fn local_zeros<T: Scalar>(dims: &[usize]) -> LocalTensor<T> {
    let size: usize = dims.iter().product();
    local_from_data(vec![T::zero(); size], dims)
}

/// Create a local tensor from flat row-major data
pub fn local_from_data<T: Scalar>(data: Vec<T>, dims: &[usize]) -> LocalTensor<T> {
    let expected: usize = dims.iter().product();
    assert_eq!(
        data.len(),
        expected,
        "data length {} does not match shape {:?}",
        data.len(),
        dims
    );
    Tensor::from(data).into_shape(DynRank::from_dims(dims))
}

/// Row-major strides for the given dimensions
pub fn strides_of(dims: &[usize]) -> Vec<usize> {
    if dims.is_empty() {
        return Vec::new();
    }
    let mut strides = vec![1; dims.len()];
    for i in (0..dims.len() - 1).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_zeros_dims() {
        let t: LocalTensor<f64> = local_zeros(&[2, 3, 4]);
        assert_eq!(t.dims(), vec![2, 3, 4]);
        assert_eq!(t.left_dim(), 2);
        assert_eq!(t.right_dim(), 4);
        assert_eq!(t.phys_dims(), vec![3]);
        assert_eq!(t.num_legs(), 1);
        assert!(t.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_local_from_data_order() {
        let data: Vec<f64> = (0..24).map(|x| x as f64).collect();
        let t = local_from_data(data, &[2, 3, 4]);
        // Row-major: index (l, s, r) -> (l * 3 + s) * 4 + r
        assert_eq!(t.data()[0], 0.0);
        assert_eq!(t.data()[(1 * 3 + 2) * 4 + 3], 23.0);
    }

    #[test]
    fn test_strides() {
        assert_eq!(strides_of(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(strides_of(&[5]), vec![1]);
        assert!(strides_of(&[]).is_empty());
    }

    #[test]
    fn test_mul_right_matrix() {
        // (1, 2, 2) tensor times 2x3 matrix
        let t = local_from_data(vec![1.0, 2.0, 3.0, 4.0], &[1, 2, 2]);
        let m = DTensor::<f64, 2>::from_fn([2, 3], |idx| (idx[0] * 3 + idx[1]) as f64);
        let out = t.mul_right_matrix(&m);
        assert_eq!(out.dims(), vec![1, 2, 3]);
        // Row (1, 2) times m: [1*0+2*3, 1*1+2*4, 1*2+2*5] = [6, 9, 12]
        assert_eq!(out.data()[0], 6.0);
        assert_eq!(out.data()[1], 9.0);
        assert_eq!(out.data()[2], 12.0);
    }

    #[test]
    fn test_mul_left_matrix() {
        let t = local_from_data(vec![1.0, 2.0, 3.0, 4.0], &[2, 2, 1]);
        // Identity leaves the tensor unchanged
        let eye = DTensor::<f64, 2>::from_fn([2, 2], |idx| if idx[0] == idx[1] { 1.0 } else { 0.0 });
        let out = t.mul_left_matrix(&eye);
        assert_eq!(out.dims(), vec![2, 2, 1]);
        assert_eq!(out.data(), t.data());
    }
}

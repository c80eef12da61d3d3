use std::ops::{AddAssign, Index, IndexMut, MulAssign, SubAssign};

use rand::Rng;

/// Linear offset of a full coordinate tuple, with dimension 0 varying
/// fastest (stride 1). Bounds are checked in debug builds only.
#[inline]
pub(crate) fn linear_offset<const N: usize>(dims: &[usize; N], index: &[usize; N]) -> usize {
    let mut offset = 0;
    let mut stride = 1;
    for dim in 0..N {
        debug_assert!(
            index[dim] < dims[dim],
            "index {} out of range for dimension {} of extent {}",
            index[dim],
            dim,
            dims[dim]
        );
        offset += index[dim] * stride;
        stride *= dims[dim];
    }
    offset
}

/// A dense multi-dimensional container with a fixed shape.
///
/// Storage is a single contiguous buffer whose length is the product of the
/// extents; the total element count never changes after construction.
/// Full-coordinate indexing (`tensor[[i, j, k]]`) yields an element;
/// `slice`/`slice_mut` fix leading coordinates and yield a borrowed view over
/// the trailing dimensions (see [`TensorView`]). `Clone` deep-copies into
/// fresh owned storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T, const N: usize> {
    dims: [usize; N],
    data: Vec<T>,
}

pub type Tensor1<T = f32> = Tensor<T, 1>;
pub type Tensor2<T = f32> = Tensor<T, 2>;
pub type Tensor3<T = f32> = Tensor<T, 3>;

impl<T: Clone + Default, const N: usize> Tensor<T, N> {
    /// Builds a zero-initialized tensor with one explicit extent per
    /// dimension. A zero-size shape holds no buffer.
    pub fn new(dims: [usize; N]) -> Tensor<T, N> {
        let len = dims.iter().product();
        Tensor {
            dims,
            data: vec![T::default(); len],
        }
    }
}

impl<T, const N: usize> Tensor<T, N> {
    pub fn dims(&self) -> [usize; N] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Copy, const N: usize> Tensor<T, N> {
    pub fn fill(&mut self, value: T) {
        for slot in self.data.iter_mut() {
            *slot = value;
        }
    }

    /// Applies `f` to every element in place.
    pub fn map<F: Fn(T) -> T>(&mut self, f: F) {
        for value in self.data.iter_mut() {
            *value = f(*value);
        }
    }

    /// Maps every element of `src` through `f` into the receiver. Both
    /// tensors must have identical shape.
    pub fn map_from<F: Fn(T) -> T>(&mut self, src: &Tensor<T, N>, f: F) {
        assert_eq!(self.dims, src.dims, "tensors are of incorrect sizes");
        for (dst, value) in self.data.iter_mut().zip(src.data.iter()) {
            *dst = f(*value);
        }
    }

    /// In-place scalar multiply.
    pub fn scale(&mut self, factor: T)
    where
        T: MulAssign,
    {
        for value in self.data.iter_mut() {
            *value *= factor;
        }
    }

    /// In-place element-wise add of a same-shaped tensor.
    pub fn add_assign_from(&mut self, rhs: &Tensor<T, N>)
    where
        T: AddAssign,
    {
        assert_eq!(self.dims, rhs.dims, "tensors are of incorrect sizes");
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a += *b;
        }
    }

    /// In-place element-wise subtract of a same-shaped tensor.
    pub fn sub_assign_from(&mut self, rhs: &Tensor<T, N>)
    where
        T: SubAssign,
    {
        assert_eq!(self.dims, rhs.dims, "tensors are of incorrect sizes");
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a -= *b;
        }
    }
}

impl<const N: usize> Tensor<f32, N> {
    /// Builds a tensor filled with independent uniform draws from [-1, 1].
    pub fn random(dims: [usize; N], rng: &mut impl Rng) -> Tensor<f32, N> {
        let mut res = Tensor::new(dims);
        for value in res.data.iter_mut() {
            *value = rng.gen::<f32>() * 2.0 - 1.0;
        }
        res
    }
}

impl<T, const N: usize> Index<[usize; N]> for Tensor<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; N]) -> &T {
        &self.data[linear_offset(&self.dims, &index)]
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Tensor<T, N> {
    #[inline]
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let offset = linear_offset(&self.dims, &index);
        &mut self.data[offset]
    }
}

/// A non-owning view over the trailing dimensions of a parent tensor.
///
/// Obtained by fixing the leading coordinate(s) of a [`Tensor`]; it aliases
/// the parent's storage starting at the linear offset of those coordinates.
/// Valid only while the parent is borrowed; never frees anything.
#[derive(Debug)]
pub struct TensorView<'a, T, const N: usize> {
    dims: [usize; N],
    data: &'a [T],
}

impl<'a, T, const N: usize> TensorView<'a, T, N> {
    pub fn dims(&self) -> [usize; N] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }
}

impl<'a, T, const N: usize> Index<[usize; N]> for TensorView<'a, T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; N]) -> &T {
        &self.data[linear_offset(&self.dims, &index)]
    }
}

/// Mutable counterpart of [`TensorView`].
#[derive(Debug)]
pub struct TensorViewMut<'a, T, const N: usize> {
    dims: [usize; N],
    data: &'a mut [T],
}

impl<'a, T, const N: usize> TensorViewMut<'a, T, N> {
    pub fn dims(&self) -> [usize; N] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        self.data
    }
}

impl<'a, T, const N: usize> Index<[usize; N]> for TensorViewMut<'a, T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; N]) -> &T {
        &self.data[linear_offset(&self.dims, &index)]
    }
}

impl<'a, T, const N: usize> IndexMut<[usize; N]> for TensorViewMut<'a, T, N> {
    #[inline]
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let offset = linear_offset(&self.dims, &index);
        &mut self.data[offset]
    }
}

impl<T> Tensor<T, 2> {
    /// Fixes the leading coordinate, yielding a 1-D view that shares this
    /// tensor's storage.
    ///
    /// With dimension 0 varying fastest, the view covers the `dims[1]`
    /// contiguous elements starting at linear offset `first`; it walks the
    /// storage in order, not `[[first, j]]` for each `j`.
    pub fn slice(&self, first: usize) -> TensorView<'_, T, 1> {
        debug_assert!(first < self.dims[0], "leading index {} out of range", first);
        let len = self.dims[1];
        TensorView {
            dims: [len],
            data: &self.data[first..first + len],
        }
    }

    /// Mutable counterpart of [`Tensor::slice`].
    pub fn slice_mut(&mut self, first: usize) -> TensorViewMut<'_, T, 1> {
        debug_assert!(first < self.dims[0], "leading index {} out of range", first);
        let len = self.dims[1];
        TensorViewMut {
            dims: [len],
            data: &mut self.data[first..first + len],
        }
    }
}

impl<T> Tensor<T, 3> {
    /// Fixes the leading coordinate, yielding a 2-D view that shares this
    /// tensor's storage: the `dims[1] * dims[2]` contiguous elements
    /// starting at linear offset `first`.
    pub fn slice(&self, first: usize) -> TensorView<'_, T, 2> {
        debug_assert!(first < self.dims[0], "leading index {} out of range", first);
        let len = self.dims[1] * self.dims[2];
        TensorView {
            dims: [self.dims[1], self.dims[2]],
            data: &self.data[first..first + len],
        }
    }

    pub fn slice_mut(&mut self, first: usize) -> TensorViewMut<'_, T, 2> {
        debug_assert!(first < self.dims[0], "leading index {} out of range", first);
        let len = self.dims[1] * self.dims[2];
        TensorViewMut {
            dims: [self.dims[1], self.dims[2]],
            data: &mut self.data[first..first + len],
        }
    }

    /// Fixes the two leading coordinates, yielding a 1-D view.
    pub fn slice2(&self, first: usize, second: usize) -> TensorView<'_, T, 1> {
        let start = linear_offset(&[self.dims[0], self.dims[1]], &[first, second]);
        let len = self.dims[2];
        TensorView {
            dims: [len],
            data: &self.data[start..start + len],
        }
    }

    pub fn slice2_mut(&mut self, first: usize, second: usize) -> TensorViewMut<'_, T, 1> {
        let start = linear_offset(&[self.dims[0], self.dims[1]], &[first, second]);
        let len = self.dims[2];
        TensorViewMut {
            dims: [len],
            data: &mut self.data[start..start + len],
        }
    }
}

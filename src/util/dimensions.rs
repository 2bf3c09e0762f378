//! Multi-dimensional array shapes.
//!
//! Shapes describe both repeated layout fields (row-major, outer to inner
//! as declared) and wave sample arrays (column-major, rows first).

use smallvec::SmallVec;

use super::{Error, Result};

/// IGOR waves have at most four dimensions.
pub const MAXDIMS: usize = 4;

/// Shape of a multi-dimensional array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Size of each dimension. Empty means scalar (rank 0).
    dims: SmallVec<[usize; MAXDIMS]>,
}

impl Dimensions {
    /// Scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: SmallVec::new() }
    }

    /// One-dimensional shape.
    pub fn d1(size: usize) -> Self {
        Self { dims: smallvec::smallvec![size] }
    }

    /// Shape from a slice of sizes.
    pub fn from_slice(sizes: &[usize]) -> Self {
        Self { dims: SmallVec::from_slice(sizes) }
    }

    /// Wave shape from an `nDim` array: the non-zero leading entries, or
    /// `(0,)` when the first entry is zero. Fails when the element count
    /// does not fit in `usize`.
    pub fn from_leading_nonzero(n_dim: &[i64]) -> Result<Self> {
        let dims = n_dim
            .iter()
            .take_while(|&&n| n > 0)
            .map(|&n| usize::try_from(n).map_err(|_| Error::invalid(format!("dimension {} out of range", n))))
            .collect::<Result<SmallVec<[usize; MAXDIMS]>>>()?;
        if dims.is_empty() {
            return Ok(Self::d1(0));
        }
        let shape = Self { dims };
        if shape.checked_num_points().is_none() {
            return Err(Error::invalid(format!("shape {} has too many elements", shape)));
        }
        Ok(shape)
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Size of one dimension, if in range.
    pub fn size(&self, dim: usize) -> Option<usize> {
        self.dims.get(dim).copied()
    }

    /// All dimension sizes.
    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of elements (product of all dimensions), saturating
    /// at `usize::MAX`.
    pub fn num_points(&self) -> usize {
        self.checked_num_points().unwrap_or(usize::MAX)
    }

    /// Total number of elements, or `None` on overflow.
    pub fn checked_num_points(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Flat offset of `index` in column-major (Fortran) order.
    ///
    /// Returns `None` if the index rank or any coordinate is out of range.
    pub fn column_major_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0;
        let mut stride = 1;
        for (&i, &n) in index.iter().zip(self.dims.iter()) {
            if i >= n {
                return None;
            }
            offset = i.checked_mul(stride).and_then(|o| o.checked_add(offset))?;
            stride = stride.saturating_mul(n);
        }
        Some(offset)
    }
}

impl From<usize> for Dimensions {
    fn from(size: usize) -> Self {
        Self::d1(size)
    }
}

impl From<Vec<usize>> for Dimensions {
    fn from(v: Vec<usize>) -> Self {
        Self { dims: SmallVec::from_vec(v) }
    }
}

impl<const N: usize> From<[usize; N]> for Dimensions {
    fn from(v: [usize; N]) -> Self {
        Self::from_slice(&v)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s)?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

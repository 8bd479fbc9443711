//! Fixed-dimension vectors over `F_p`.
//!
//! A [`Vector`] is a small value type: coordinates live inline, every
//! operation returns a fresh vector, and nothing is ever mutated in place.
//! Only the dimensions with a published operation (3 and 4) can be built.

use crate::{error::DimensionError, Field};
use std::fmt;
use zeroize::Zeroize;

/// Largest supported dimension.
pub const MAX_DIM: usize = 4;

/// Dimensions for which an operation is defined.
pub const SUPPORTED_DIMS: [usize; 2] = [3, 4];

/// Checks that `dim` is one of [`SUPPORTED_DIMS`].
pub fn check_dim(dim: usize) -> Result<(), DimensionError> {
    if SUPPORTED_DIMS.contains(&dim) {
        Ok(())
    } else {
        Err(DimensionError::Unsupported { dim })
    }
}

/// An ordered tuple of `n ∈ {3, 4}` canonical field residues.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Zeroize)]
pub struct Vector {
    dim: usize,
    coords: [u64; MAX_DIM],
}

impl Vector {
    /// Builds a vector from `values`, reducing each coordinate modulo `p`.
    pub fn new(field: &Field, values: &[u64]) -> Result<Self, DimensionError> {
        check_dim(values.len())?;
        let mut coords = [0u64; MAX_DIM];
        for (slot, &v) in coords.iter_mut().zip(values) {
            *slot = field.reduce(v);
        }
        Ok(Vector {
            dim: values.len(),
            coords,
        })
    }

    /// Wraps coordinates that are already canonical for a supported `dim`.
    pub(crate) const fn from_raw(dim: usize, coords: [u64; MAX_DIM]) -> Self {
        Vector { dim, coords }
    }

    /// The zero vector of dimension `dim`.
    pub fn zero(dim: usize) -> Result<Self, DimensionError> {
        check_dim(dim)?;
        Ok(Vector {
            dim,
            coords: [0; MAX_DIM],
        })
    }

    /// The standard basis vector `e_index` of dimension `dim`.
    pub fn basis(dim: usize, index: usize) -> Result<Self, DimensionError> {
        let mut v = Self::zero(dim)?;
        if index >= dim {
            return Err(DimensionError::Mismatch {
                expected: dim,
                actual: index + 1,
            });
        }
        v.coords[index] = 1;
        Ok(v)
    }

    /// Returns the dimension `n`.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the coordinates as a slice of length `n`.
    #[inline]
    pub fn coords(&self) -> &[u64] {
        &self.coords[..self.dim]
    }

    /// Returns coordinate `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.dim()`.
    #[inline]
    pub fn get(&self, i: usize) -> u64 {
        self.coords()[i]
    }

    /// Fails with [`DimensionError::Mismatch`] unless `self` has dimension `expected`.
    pub fn expect_dim(&self, expected: usize) -> Result<(), DimensionError> {
        if self.dim == expected {
            Ok(())
        } else {
            Err(DimensionError::Mismatch {
                expected,
                actual: self.dim,
            })
        }
    }

    fn zip_with(
        &self,
        other: &Vector,
        op: impl Fn(u64, u64) -> u64,
    ) -> Result<Vector, DimensionError> {
        other.expect_dim(self.dim)?;
        let mut coords = [0u64; MAX_DIM];
        for i in 0..self.dim {
            coords[i] = op(self.coords[i], other.coords[i]);
        }
        Ok(Vector {
            dim: self.dim,
            coords,
        })
    }

    fn map(&self, op: impl Fn(u64) -> u64) -> Vector {
        let mut coords = [0u64; MAX_DIM];
        for i in 0..self.dim {
            coords[i] = op(self.coords[i]);
        }
        Vector {
            dim: self.dim,
            coords,
        }
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Vector, field: &Field) -> Result<Vector, DimensionError> {
        self.zip_with(other, |a, b| field.add(a, b))
    }

    /// Component-wise difference `self - other`.
    pub fn sub(&self, other: &Vector, field: &Field) -> Result<Vector, DimensionError> {
        self.zip_with(other, |a, b| field.sub(a, b))
    }

    /// Additive inverse.
    pub fn neg(&self, field: &Field) -> Vector {
        self.map(|a| field.neg(a))
    }

    /// Multiplies every coordinate by the scalar `c`.
    pub fn scale(&self, c: u64, field: &Field) -> Vector {
        self.map(|a| field.mul(a, c))
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Vector").field(&self.coords()).finish()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

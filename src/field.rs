//! Finite field arithmetic.
//!
//! The [`Field`](struct.Field.html) type carries a modulus `p` and exposes
//! the residue operations every other layer is built on.  Elements are plain
//! `u64` residues; every method returns a value in the canonical range
//! `[0, p)` and multiplication widens to `u128` before reducing, so no
//! intermediate can wrap.

use crate::error::FieldError;

/// A prime field `F_p`.
///
/// Primality is not verified.  For a composite modulus the ring operations
/// still behave, and [`inv`](Field::inv) reports elements sharing a factor
/// with `p` as [`FieldError::NotInvertible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    p: u64,
}

impl Field {
    /// Creates a field with modulus `p`.
    pub fn new(p: u64) -> Result<Self, FieldError> {
        if p < 2 {
            return Err(FieldError::InvalidModulus { modulus: p });
        }
        Ok(Field { p })
    }

    /// Wraps a modulus already known to be valid.
    pub(crate) const fn from_prime(p: u64) -> Self {
        Field { p }
    }

    /// The prime `p`.
    #[inline]
    pub fn modulus(&self) -> u64 {
        self.p
    }

    /// Reduces an arbitrary integer to its canonical residue.
    #[inline]
    pub fn reduce(&self, a: u64) -> u64 {
        a % self.p
    }

    /// Adds two field elements.
    #[inline]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        let s = (a % self.p) as u128 + (b % self.p) as u128;
        (s % self.p as u128) as u64
    }

    /// Subtracts `b` from `a`.
    #[inline]
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        let a = a % self.p;
        let b = b % self.p;
        if a >= b {
            a - b
        } else {
            self.p - (b - a)
        }
    }

    /// Returns the additive inverse of `a`.
    #[inline]
    pub fn neg(&self, a: u64) -> u64 {
        self.sub(0, a)
    }

    /// `a · b mod p`, widened through `u128`.
    #[inline]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        let a = a % self.p;
        let b = b % self.p;
        ((a as u128 * b as u128) % self.p as u128) as u64
    }

    /// Computes the multiplicative inverse of `a` with the extended
    /// Euclidean algorithm.
    pub fn inv(&self, a: u64) -> Result<u64, FieldError> {
        let value = a % self.p;
        let (mut old_r, mut r) = (value as i128, self.p as i128);
        let (mut old_s, mut s) = (1i128, 0i128);
        while r != 0 {
            let q = old_r / r;
            (old_r, r) = (r, old_r - q * r);
            (old_s, s) = (s, old_s - q * s);
        }
        if old_r != 1 {
            return Err(FieldError::NotInvertible {
                value,
                modulus: self.p,
            });
        }
        Ok(old_s.rem_euclid(self.p as i128) as u64)
    }

    /// Divides `a` by `b`.
    #[inline]
    pub fn div(&self, a: u64, b: u64) -> Result<u64, FieldError> {
        Ok(self.mul(a, self.inv(b)?))
    }

    /// `a^e mod p` by square-and-multiply.
    #[inline]
    pub fn pow(&self, mut a: u64, mut e: u64) -> u64 {
        a %= self.p;
        let mut result = 1 % self.p;
        while e > 0 {
            if e & 1 == 1 {
                result = self.mul(result, a);
            }
            a = self.mul(a, a);
            e >>= 1;
        }
        result
    }
}

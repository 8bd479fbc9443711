//! Error kinds raised by the algebra engine.
//!
//! Every error here signals a programming or configuration mistake rather
//! than a transient condition: callers receive them immediately and no
//! operation substitutes a fallback value.

use thiserror::Error;

/// Failures of the underlying prime-field arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("modulus {modulus} is too small (must be at least 2)")]
    /// The modulus cannot define a field.
    InvalidModulus {
        /// Rejected modulus.
        modulus: u64,
    },
    #[error("{value} is not invertible modulo {modulus}")]
    /// The element is zero or shares a factor with the modulus.
    NotInvertible {
        /// Element whose inverse was requested.
        value: u64,
        /// Field modulus.
        modulus: u64,
    },
    #[error("residue {value} is not below modulus {modulus}")]
    /// An encoded residue was not in canonical range.
    OutOfRange {
        /// Offending residue.
        value: u64,
        /// Field modulus.
        modulus: u64,
    },
}

/// Failures caused by combining objects of incompatible shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("dimension mismatch (expected {expected}, got {actual})")]
    /// Two operands (or an operand and an operator) disagree on `n`.
    Mismatch {
        /// Dimension required by the receiver.
        expected: usize,
        /// Dimension actually supplied.
        actual: usize,
    },
    #[error("unsupported dimension {dim} (only 3 and 4 are defined)")]
    /// The requested vector length has no published operation.
    Unsupported {
        /// Requested dimension.
        dim: usize,
    },
    #[error("encoded share has {actual} bytes, expected {expected}")]
    /// A wire-encoded share had the wrong length.
    EncodedLength {
        /// Byte length implied by the operator dimension.
        expected: usize,
        /// Byte length received.
        actual: usize,
    },
}

/// Umbrella error returned by the higher layers of the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    #[error("field error: {0}")]
    /// Arithmetic failure in `F_p`.
    Field(#[from] FieldError),
    #[error("dimension error: {0}")]
    /// Shape mismatch between vectors, tensors, or shares.
    Dimension(#[from] DimensionError),
    #[error("invalid exponent {exponent}: {reason}")]
    /// Exponent is zero or outside the configured sampling range.
    InvalidExponent {
        /// Rejected exponent.
        exponent: u64,
        /// Human-readable constraint that was violated.
        reason: String,
    },
    #[error("invalid parameter set: {0}")]
    /// A parameter set failed to load or validate.
    Params(String),
    #[error("encoding error: {0}")]
    /// A textual or binary share encoding could not be decoded.
    Encoding(String),
}

impl AlgebraError {
    pub(crate) fn exponent(exponent: u64, reason: impl Into<String>) -> Self {
        AlgebraError::InvalidExponent {
            exponent,
            reason: reason.into(),
        }
    }
}

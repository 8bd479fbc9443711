#![deny(missing_docs)]

//! # power_algebra
//!
//! **power_algebra** implements small vector algebras over a prime field
//! `F_p` whose product `∘` is neither commutative nor associative, yet is
//! power-associative: every element generates a well-defined sequence of
//! powers `a^k`.  On top of that property the crate offers logarithmic-time
//! exponentiation and a two-party key agreement in the style of
//! Diffie–Hellman.
//!
//! ## Features
//!
//! * **Field and vectors**: [`Field`] arithmetic modulo `p < 2^64` and
//!   fixed-size [`Vector`]s of dimension 3 or 4.
//! * **Multilinear product**: [`MultilinearOperator`] evaluates
//!   `a ∘ b = T(a + s, b + s) − s` for a structure tensor `T` and shift `s`
//!   taken from a [`ParameterSet`].  The published shapes `M3` and `M4`
//!   ship with fixed coefficients; custom sets load from JSON.
//! * **Power engine**: [`PowerEngine`] computes `a^k` by square-and-multiply
//!   in `O(log k)` products, with a naive left fold kept for verification.
//! * **Key exchange**: the [`exchange`] module generates secret exponents,
//!   public shares `g^m` and the shared value `g^m ∘ g^k`.
//! * **Research tooling**: [`symbolic`] measures monomial growth of `X^k`
//!   over free indeterminates and [`audit`](mod@audit) checks the algebraic laws a
//!   parameter set must satisfy.
//!
//! ## Usage
//!
//! ```rust
//! use power_algebra::{ExponentRange, KeyExchange, MultilinearOperator, ParameterSet, Zeroizing};
//!
//! let params = ParameterSet::toy_m3();
//! let op = MultilinearOperator::from_params(&params).unwrap();
//! let range = ExponentRange::new(1, 1_000).unwrap();
//! let kx = KeyExchange::new(&op, *params.base(), range).unwrap();
//!
//! let alice = kx.keygen_with_secret(Zeroizing::new(2)).unwrap();
//! let bob = kx.keygen_with_secret(Zeroizing::new(3)).unwrap();
//! let alice_share = *alice.public_share();
//! let bob_share = *bob.public_share();
//!
//! let s1 = alice.derive(&bob_share).unwrap();
//! let s2 = bob.derive(&alice_share).unwrap();
//! assert_eq!(s1.value(), s2.value());
//! assert_eq!(s1.value().coords(), &[5, 8, 8]);
//! assert_eq!(s1.session_key(), s2.session_key());
//! ```
//!
//! Secrets derived by this construction are a function of the two public
//! shares; the crate is a research artifact, not a vetted key agreement.

pub mod audit;
pub mod data;
mod error;
pub mod exchange;
mod field;
mod io;
mod operator;
pub mod params;
mod power;
mod prng;
pub mod symbolic;
mod transcript;
mod vector;

pub use audit::{audit, AuditReport};
pub use data::{
    compute_digest as growth_record_digest, parse_record as parse_growth_record,
    verify_record_lines as verify_growth_lines, write_record as write_growth_record,
    GrowthRecord,
};
pub use error::{AlgebraError, DimensionError, FieldError};
pub use exchange::{ExponentRange, KeyExchange, Party, PublicShare, SharedSecret};
pub use field::Field;
pub use io::write_text_series;
pub use operator::MultilinearOperator;
pub use params::{ParameterSet, StructureTensor};
pub use power::{PowerEngine, PowerTrace, TraceEntry, TraceStep};
pub use prng::{derive_many_mod_p, SimplePrng};
pub use symbolic::{growth_profile, GrowthStats, Polynomial, SymbolicVector};
pub use transcript::Transcript;
pub use vector::{Vector, MAX_DIM, SUPPORTED_DIMS};
pub use zeroize::Zeroizing;

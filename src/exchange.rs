//! Two-party key agreement over a power-associative algebra.
//!
//! Both parties share an operator and a public base vector `g`.  Each
//! samples a secret exponent, publishes `g^m` (resp. `g^k`), and combines
//! its own share with the peer's under `∘`.  Power-associativity gives
//!
//! ```text
//! g^m ∘ g^k = g^(m+k) = g^k ∘ g^m
//! ```
//!
//! so both sides hold the same vector.  Only the additive law is used:
//! `(g^m)^k` is in general *not* `g^(mk)` in a non-associative algebra.
//!
//! Secret exponents and derived secrets are wiped from memory when dropped,
//! and a [`Party`] is consumed by [`Party::derive`] so no key material
//! outlives the exchange.

use crate::{
    error::{AlgebraError, DimensionError, FieldError},
    transcript::Transcript,
    MultilinearOperator, ParameterSet, PowerEngine, Vector,
};
use log::debug;
use rand::{CryptoRng, Rng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Largest admissible secret exponent; keeps `m + k` inside `u64`.
pub const MAX_EXPONENT: u64 = 1 << 62;

/// Smallest secret exponent of the default range.
pub const DEFAULT_MIN_EXPONENT: u64 = 1 << 32;

/// Domain tag for session-key derivation.
const SESSION_KEY_DOMAIN: &[u8] = b"power_algebra:v1:session-key";

/// Bytes per encoded residue on the wire.
pub const RESIDUE_BYTES: usize = 8;

/// Inclusive range secret exponents are sampled from and checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentRange {
    min: u64,
    max: u64,
}

impl ExponentRange {
    /// Creates the range `[min, max]`.
    ///
    /// Requires `1 <= min <= max <= MAX_EXPONENT`.
    pub fn new(min: u64, max: u64) -> Result<Self, AlgebraError> {
        if min == 0 {
            return Err(AlgebraError::exponent(min, "range minimum must be positive"));
        }
        if max > MAX_EXPONENT {
            return Err(AlgebraError::exponent(
                max,
                format!("range maximum must not exceed {MAX_EXPONENT}"),
            ));
        }
        if min > max {
            return Err(AlgebraError::exponent(
                min,
                format!("range minimum exceeds maximum {max}"),
            ));
        }
        Ok(Self { min, max })
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Upper bound (inclusive).
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Returns `true` when `e` lies in the range.
    pub fn contains(&self, e: u64) -> bool {
        (self.min..=self.max).contains(&e)
    }

    /// Fails with [`AlgebraError::InvalidExponent`] unless `e` lies in the range.
    pub fn check(&self, e: u64) -> Result<(), AlgebraError> {
        if self.contains(e) {
            Ok(())
        } else {
            Err(AlgebraError::exponent(
                e,
                format!("outside configured range [{}, {}]", self.min, self.max),
            ))
        }
    }

    /// Draws a uniform exponent from the range.
    pub fn sample<R: RngCore + CryptoRng>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for ExponentRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_EXPONENT,
            max: MAX_EXPONENT,
        }
    }
}

/// A party's public value `g^m`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicShare {
    value: Vector,
}

impl PublicShare {
    /// Wraps a received vector after checking it against `operator`.
    pub fn new(operator: &MultilinearOperator, value: Vector) -> Result<Self, AlgebraError> {
        operator.check_vector(&value)?;
        Ok(Self { value })
    }

    /// The underlying vector.
    pub fn vector(&self) -> &Vector {
        &self.value
    }

    /// Wire encoding: `n` big-endian `u64` residues.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.value
            .coords()
            .iter()
            .flat_map(|c| c.to_be_bytes())
            .collect()
    }

    /// Decodes the wire encoding, checking length and residue range.
    pub fn from_bytes(operator: &MultilinearOperator, bytes: &[u8]) -> Result<Self, AlgebraError> {
        let expected = operator.dim() * RESIDUE_BYTES;
        if bytes.len() != expected {
            return Err(DimensionError::EncodedLength {
                expected,
                actual: bytes.len(),
            }
            .into());
        }
        let p = operator.field().modulus();
        let mut coords = Vec::with_capacity(operator.dim());
        for chunk in bytes.chunks_exact(RESIDUE_BYTES) {
            let mut word = [0u8; RESIDUE_BYTES];
            word.copy_from_slice(chunk);
            let value = u64::from_be_bytes(word);
            if value >= p {
                return Err(FieldError::OutOfRange { value, modulus: p }.into());
            }
            coords.push(value);
        }
        Self::new(operator, operator.vector(&coords)?)
    }

    /// Lowercase hex of [`to_bytes`](Self::to_bytes).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parses the output of [`to_hex`](Self::to_hex).
    pub fn from_hex(operator: &MultilinearOperator, text: &str) -> Result<Self, AlgebraError> {
        let bytes =
            hex::decode(text.trim()).map_err(|err| AlgebraError::Encoding(err.to_string()))?;
        Self::from_bytes(operator, &bytes)
    }
}

impl fmt::Debug for PublicShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicShare").field(&self.value).finish()
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct SecretExponent(u64);

impl fmt::Debug for SecretExponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Public setup shared by both parties: operator, base vector, exponent range.
#[derive(Debug, Clone, Copy)]
pub struct KeyExchange<'a> {
    engine: PowerEngine<'a>,
    base: Vector,
    range: ExponentRange,
}

impl<'a> KeyExchange<'a> {
    /// Creates the public setup.
    pub fn new(
        operator: &'a MultilinearOperator,
        base: Vector,
        range: ExponentRange,
    ) -> Result<Self, AlgebraError> {
        PublicShare::new(operator, base)?;
        Ok(Self {
            engine: PowerEngine::new(operator),
            base,
            range,
        })
    }

    /// Uses the recommended base of `params` and the default exponent range.
    pub fn from_params(
        operator: &'a MultilinearOperator,
        params: &ParameterSet,
    ) -> Result<Self, AlgebraError> {
        Self::new(operator, *params.base(), ExponentRange::default())
    }

    /// The operator in use.
    pub fn operator(&self) -> &'a MultilinearOperator {
        self.engine.operator()
    }

    /// The public base vector `g`.
    pub fn base(&self) -> &Vector {
        &self.base
    }

    /// The configured exponent range.
    pub fn range(&self) -> ExponentRange {
        self.range
    }

    /// Samples a secret exponent and computes the public share.
    pub fn keygen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Party<'a>, AlgebraError> {
        let secret = SecretExponent(self.range.sample(rng));
        self.party_from(secret)
    }

    /// Builds a party from a caller-chosen secret exponent.
    ///
    /// The caller's copy is wiped when `secret` is dropped here.
    pub fn keygen_with_secret(
        &self,
        secret: Zeroizing<u64>,
    ) -> Result<Party<'a>, AlgebraError> {
        let secret = SecretExponent(*secret);
        self.range.check(secret.0)?;
        self.party_from(secret)
    }

    fn party_from(&self, secret: SecretExponent) -> Result<Party<'a>, AlgebraError> {
        let value = self.engine.power(&self.base, secret.0)?;
        debug!(
            "{}: public share computed for base {}",
            self.operator().name(),
            self.base
        );
        Ok(Party {
            operator: self.operator(),
            base: self.base,
            secret,
            share: PublicShare { value },
        })
    }
}

/// One participant's private state between key generation and derivation.
pub struct Party<'a> {
    operator: &'a MultilinearOperator,
    base: Vector,
    secret: SecretExponent,
    share: PublicShare,
}

impl<'a> Party<'a> {
    /// The share to transmit to the peer.
    pub fn public_share(&self) -> &PublicShare {
        &self.share
    }

    /// Combines the local share with the peer's, consuming this party.
    ///
    /// The result is `own ∘ peer = g^(m+k)`.  It is computed from the two
    /// public shares; the secret exponent is only needed to produce the
    /// local share and is wiped when `self` is dropped here.
    pub fn derive(self, peer: &PublicShare) -> Result<SharedSecret, AlgebraError> {
        let peer = PublicShare::new(self.operator, peer.value)?;
        let value = self.operator.apply(&self.share.value, &peer.value)?;
        debug!("{}: shared secret derived", self.operator.name());
        let (lo, hi) = if self.share.value.coords() <= peer.value.coords() {
            (self.share.value, peer.value)
        } else {
            (peer.value, self.share.value)
        };
        Ok(SharedSecret {
            label: self.operator.name().to_string(),
            modulus: self.operator.field().modulus(),
            base: self.base,
            shares: [lo, hi],
            value,
        })
    }
}

impl fmt::Debug for Party<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Party")
            .field("operator", &self.operator.name())
            .field("share", &self.share)
            .field("secret", &self.secret)
            .finish()
    }
}

/// The agreed vector `g^(m+k)` plus the public context it was derived in.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    label: String,
    modulus: u64,
    base: Vector,
    shares: [Vector; 2],
    value: Vector,
}

impl SharedSecret {
    /// The shared vector.
    pub fn value(&self) -> &Vector {
        &self.value
    }

    /// A 32-byte session key bound to the parameter set, base and both shares.
    pub fn session_key(&self) -> [u8; 32] {
        let mut transcript = Transcript::new(SESSION_KEY_DOMAIN);
        transcript.append_label(self.label.as_bytes());
        transcript.append(self.modulus);
        transcript.append_vector(&self.base);
        for share in &self.shares {
            transcript.append_vector(share);
        }
        transcript.append_vector(&self.value);
        transcript.digest()
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.session_key() == other.session_key()
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("label", &self.label)
            .field("value", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimplePrng;

    fn toy() -> (ParameterSet, MultilinearOperator) {
        let params = ParameterSet::toy_m3();
        let op = MultilinearOperator::from_params(&params).unwrap();
        (params, op)
    }

    #[test]
    fn test_toy_round_trip() {
        let (params, op) = toy();
        let range = ExponentRange::new(1, 100).unwrap();
        let kx = KeyExchange::new(&op, *params.base(), range).unwrap();
        let alice = kx.keygen_with_secret(Zeroizing::new(2)).unwrap();
        let bob = kx.keygen_with_secret(Zeroizing::new(3)).unwrap();
        assert_eq!(alice.public_share().vector().coords(), &[2, 4, 4]);
        assert_eq!(bob.public_share().vector().coords(), &[1, 0, 0]);
        let a_share = *alice.public_share();
        let b_share = *bob.public_share();
        let s_a = alice.derive(&b_share).unwrap();
        let s_b = bob.derive(&a_share).unwrap();
        assert_eq!(s_a.value().coords(), &[5, 8, 8]);
        assert_eq!(s_a, s_b);
        assert_eq!(s_a.session_key(), s_b.session_key());
    }

    #[test]
    fn test_chosen_secret_taken_as_zeroizing() {
        let (params, op) = toy();
        let kx = KeyExchange::new(&op, *params.base(), ExponentRange::new(1, 10).unwrap()).unwrap();
        let secret = Zeroizing::new(6u64);
        let party = kx.keygen_with_secret(secret).unwrap();
        let expected = PowerEngine::new(&op).power(params.base(), 6).unwrap();
        assert_eq!(party.public_share().vector(), &expected);
        assert!(kx.keygen_with_secret(Zeroizing::new(11)).is_err());
    }

    #[test]
    fn test_shipped_round_trip_matches_power() {
        let params = ParameterSet::m4();
        let op = MultilinearOperator::from_params(&params).unwrap();
        let kx = KeyExchange::from_params(&op, &params).unwrap();
        let mut rng = SimplePrng::new(2024);
        let m = kx.range().sample(&mut rng);
        let k = kx.range().sample(&mut rng);
        let alice = kx.keygen_with_secret(Zeroizing::new(m)).unwrap();
        let bob = kx.keygen_with_secret(Zeroizing::new(k)).unwrap();
        let (a_share, b_share) = (*alice.public_share(), *bob.public_share());
        let s_a = alice.derive(&b_share).unwrap();
        let s_b = bob.derive(&a_share).unwrap();
        let expected = PowerEngine::new(&op).power(params.base(), m + k).unwrap();
        assert_eq!(s_a.value(), &expected);
        assert_eq!(s_b.value(), &expected);
    }

    #[test]
    fn test_keygen_with_rng_stays_in_range() {
        let (params, op) = toy();
        let range = ExponentRange::new(5, 9).unwrap();
        let kx = KeyExchange::new(&op, *params.base(), range).unwrap();
        let mut rng = SimplePrng::new(1);
        for _ in 0..20 {
            let party = kx.keygen(&mut rng).unwrap();
            let share = *party.public_share().vector();
            let engine = PowerEngine::new(&op);
            assert!((5..=9).any(|e| engine.power(params.base(), e).unwrap() == share));
        }
    }

    #[test]
    fn test_exponent_range_validation() {
        assert!(ExponentRange::new(0, 10).is_err());
        assert!(ExponentRange::new(10, 9).is_err());
        assert!(ExponentRange::new(1, MAX_EXPONENT + 1).is_err());
        let r = ExponentRange::new(3, 7).unwrap();
        assert!(r.check(3).is_ok() && r.check(7).is_ok());
        assert!(matches!(
            r.check(8),
            Err(AlgebraError::InvalidExponent { exponent: 8, .. })
        ));
        let (params, op) = toy();
        let kx = KeyExchange::new(&op, *params.base(), r).unwrap();
        assert!(kx.keygen_with_secret(Zeroizing::new(0)).is_err());
        assert!(kx.keygen_with_secret(Zeroizing::new(2)).is_err());
    }

    #[test]
    fn test_mismatched_share_dimension() {
        let (params, op) = toy();
        let kx = KeyExchange::new(&op, *params.base(), ExponentRange::new(1, 10).unwrap()).unwrap();
        let alice = kx.keygen_with_secret(Zeroizing::new(4)).unwrap();
        let foreign = PublicShare {
            value: Vector::new(op.field(), &[1, 2, 3, 4]).unwrap(),
        };
        assert!(matches!(
            alice.derive(&foreign),
            Err(AlgebraError::Dimension(DimensionError::Mismatch {
                expected: 3,
                actual: 4
            }))
        ));
        let m4 = ParameterSet::m4();
        assert!(KeyExchange::new(&op, *m4.base(), ExponentRange::default()).is_err());
    }

    #[test]
    fn test_wire_encoding() {
        let (params, op) = toy();
        let kx = KeyExchange::new(&op, *params.base(), ExponentRange::new(1, 10).unwrap()).unwrap();
        let party = kx.keygen_with_secret(Zeroizing::new(5)).unwrap();
        let share = *party.public_share();
        let bytes = share.to_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[..8], &5u64.to_be_bytes());
        assert_eq!(PublicShare::from_bytes(&op, &bytes).unwrap(), share);
        assert_eq!(PublicShare::from_hex(&op, &share.to_hex()).unwrap(), share);
        assert!(matches!(
            PublicShare::from_bytes(&op, &bytes[..16]),
            Err(AlgebraError::Dimension(DimensionError::EncodedLength {
                expected: 24,
                actual: 16
            }))
        ));
        let mut bad = bytes.clone();
        bad[7] = 11;
        assert!(matches!(
            PublicShare::from_bytes(&op, &bad),
            Err(AlgebraError::Field(FieldError::OutOfRange { value: 11, .. }))
        ));
        assert!(matches!(
            PublicShare::from_hex(&op, "zz"),
            Err(AlgebraError::Encoding(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let (params, op) = toy();
        let kx = KeyExchange::new(&op, *params.base(), ExponentRange::new(1, 10).unwrap()).unwrap();
        let party = kx.keygen_with_secret(Zeroizing::new(7)).unwrap();
        assert!(format!("{party:?}").contains("<redacted>"));
        let share = *party.public_share();
        let secret = party.derive(&share).unwrap();
        assert!(!format!("{secret:?}").contains(&secret.value().to_string()));
    }
}

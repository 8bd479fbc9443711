//! Checks of the algebraic laws a parameter set must satisfy.
//!
//! Exponentiation and key agreement silently rely on power-associativity
//! and internal commutativity of the chosen `(T, s)`.  This module lets
//! whoever supplies a parameter set confirm those laws over a bounded grid
//! of exponents, and find concrete witnesses that the product is neither
//! commutative nor associative.  Sample vectors are derived from a seed so
//! that reports are reproducible.

use crate::{
    error::{AlgebraError, DimensionError},
    prng::derive_many_mod_p,
    MultilinearOperator, PowerEngine, Vector,
};
use log::warn;
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

const AUDIT_DOMAIN: &[u8] = b"power_algebra:v1:audit";

/// Largest grid bound [`audit`] accepts; each checked vector costs `bound²` products.
pub const MAX_AUDIT_BOUND: u64 = 4096;

/// Outcome of [`audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// Name of the audited operator.
    pub name: String,
    /// Largest exponent `m`, `n` checked on the power grid.
    pub bound: u64,
    /// Number of base vectors checked (the supplied base plus samples).
    pub bases_checked: usize,
    /// A pair with `a ∘ b ≠ b ∘ a`, if one was found.
    pub non_commutative_witness: Option<(Vector, Vector)>,
    /// A triple with `(a ∘ b) ∘ c ≠ a ∘ (b ∘ c)`, if one was found.
    pub non_associative_witness: Option<(Vector, Vector, Vector)>,
    /// `a^m ∘ a^n = a^(m+n)` held on the whole grid.
    pub power_associative: bool,
    /// `a^m ∘ a^n = a^n ∘ a^m` held on the whole grid.
    pub internally_commutative: bool,
}

impl AuditReport {
    /// `true` when both laws hold and both witnesses were found.
    pub fn passed(&self) -> bool {
        self.power_associative
            && self.internally_commutative
            && self.non_commutative_witness.is_some()
            && self.non_associative_witness.is_some()
    }
}

/// Derives `count` reproducible sample vectors for `operator`.
pub fn sample_vectors(
    operator: &MultilinearOperator,
    seed: u64,
    count: usize,
) -> Result<Vec<Vector>, DimensionError> {
    let p = operator.field().modulus();
    (0..count)
        .map(|i| {
            let coords = derive_many_mod_p(p, AUDIT_DOMAIN, &[seed, i as u64], operator.dim());
            operator.vector(&coords)
        })
        .collect()
}

/// Audits `operator` with `base` and `samples` derived vectors over `1 ≤ m, n ≤ bound`.
pub fn audit(
    operator: &MultilinearOperator,
    base: &Vector,
    bound: u64,
    samples: usize,
    seed: u64,
) -> Result<AuditReport, AlgebraError> {
    if bound == 0 || bound > MAX_AUDIT_BOUND {
        return Err(AlgebraError::exponent(
            bound,
            format!("audit bound must lie in 1..={MAX_AUDIT_BOUND}"),
        ));
    }
    let max_exponent = bound
        .checked_mul(2)
        .ok_or_else(|| AlgebraError::exponent(bound, "audit bound overflows"))?;
    operator.check_vector(base)?;
    let mut bases = vec![*base];
    bases.extend(sample_vectors(operator, seed, samples)?);

    let non_commutative_witness = find_non_commutative(operator, &bases)?;
    let non_associative_witness = find_non_associative(operator, &bases)?;

    let engine = PowerEngine::new(operator);
    let mut power_associative = true;
    let mut internally_commutative = true;
    for a in &bases {
        let powers = engine.power_sequence(a, max_exponent)?;
        let (assoc, comm) = check_grid(operator, &powers, bound as usize)?;
        power_associative &= assoc;
        internally_commutative &= comm;
    }

    let report = AuditReport {
        name: operator.name().to_string(),
        bound,
        bases_checked: bases.len(),
        non_commutative_witness,
        non_associative_witness,
        power_associative,
        internally_commutative,
    };
    if !report.passed() {
        warn!("{}: parameter audit failed: {:?}", report.name, report);
    }
    Ok(report)
}

fn find_non_commutative(
    operator: &MultilinearOperator,
    bases: &[Vector],
) -> Result<Option<(Vector, Vector)>, AlgebraError> {
    for a in bases {
        for b in bases {
            if operator.apply(a, b)? != operator.apply(b, a)? {
                return Ok(Some((*a, *b)));
            }
        }
    }
    Ok(None)
}

fn find_non_associative(
    operator: &MultilinearOperator,
    bases: &[Vector],
) -> Result<Option<(Vector, Vector, Vector)>, AlgebraError> {
    for a in bases {
        for b in bases {
            let ab = operator.apply(a, b)?;
            for c in bases {
                let left = operator.apply(&ab, c)?;
                let right = operator.apply(a, &operator.apply(b, c)?)?;
                if left != right {
                    return Ok(Some((*a, *b, *c)));
                }
            }
        }
    }
    Ok(None)
}

/// `powers[e - 1] = a^e` for `e = 1 ..= 2·bound`.
fn check_grid(
    operator: &MultilinearOperator,
    powers: &[Vector],
    bound: usize,
) -> Result<(bool, bool), AlgebraError> {
    let pairs: Vec<(usize, usize)> = (1..=bound)
        .flat_map(|m| (1..=bound).map(move |n| (m, n)))
        .collect();
    let check = |&(m, n): &(usize, usize)| -> Result<(bool, bool), AlgebraError> {
        let mn = operator.apply(&powers[m - 1], &powers[n - 1])?;
        let nm = operator.apply(&powers[n - 1], &powers[m - 1])?;
        Ok((mn == powers[m + n - 1], mn == nm))
    };
    #[cfg(not(target_arch = "wasm32"))]
    let results: Vec<(bool, bool)> = pairs.par_iter().map(check).collect::<Result<_, _>>()?;
    #[cfg(target_arch = "wasm32")]
    let results: Vec<(bool, bool)> = pairs.iter().map(check).collect::<Result<_, _>>()?;
    Ok(results
        .iter()
        .fold((true, true), |(a, c), &(ra, rc)| (a && ra, c && rc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::StructureTensor, Field, ParameterSet};

    #[test]
    fn test_shipped_sets_pass() {
        for params in [ParameterSet::toy_m3(), ParameterSet::m3(), ParameterSet::m4()] {
            let op = MultilinearOperator::from_params(&params).unwrap();
            let report = audit(&op, params.base(), 8, 3, 42).unwrap();
            assert!(report.passed(), "{report:?}");
            assert_eq!(report.bases_checked, 4);
        }
    }

    #[test]
    fn test_commutative_associative_set_fails_audit() {
        let field = Field::new(101).unwrap();
        let mut entries = vec![0u64; 27];
        // Componentwise product: T[i][i][i] = 1.
        for i in 0..3 {
            entries[(i * 3 + i) * 3 + i] = 1;
        }
        let tensor = StructureTensor::new(&field, 3, &entries).unwrap();
        let shift = Vector::new(&field, &[0, 0, 0]).unwrap();
        let op = MultilinearOperator::new("hadamard", field, tensor, shift).unwrap();
        let base = op.vector(&[2, 3, 5]).unwrap();
        let report = audit(&op, &base, 4, 2, 1).unwrap();
        // Commutative and associative: the laws hold but no witnesses exist.
        assert!(report.power_associative);
        assert!(report.internally_commutative);
        assert!(report.non_commutative_witness.is_none());
        assert!(report.non_associative_witness.is_none());
        assert!(!report.passed());
    }

    #[test]
    fn test_non_power_associative_tensor_detected() {
        // T[0][1][0] = T[1][2][0] = T[2][0][1] = 1: a sparse tensor without
        // the quadratic structure of the published shapes.
        let field = Field::new(101).unwrap();
        let mut entries = vec![0u64; 27];
        entries[3] = 1;
        entries[15] = 1;
        entries[19] = 1;
        let tensor = StructureTensor::new(&field, 3, &entries).unwrap();
        let shift = Vector::new(&field, &[1, 0, 0]).unwrap();
        let op = MultilinearOperator::new("generic", field, tensor, shift).unwrap();
        let base = op.vector(&[2, 3, 5]).unwrap();
        let report = audit(&op, &base, 4, 2, 1).unwrap();
        assert!(!report.power_associative);
        assert!(!report.passed());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let params = ParameterSet::toy_m3();
        let op = MultilinearOperator::from_params(&params).unwrap();
        assert!(audit(&op, params.base(), 0, 1, 0).is_err());
        let m4 = ParameterSet::m4();
        assert!(audit(&op, m4.base(), 3, 1, 0).is_err());
    }

    #[test]
    fn test_rejects_oversized_bounds() {
        let params = ParameterSet::toy_m3();
        let op = MultilinearOperator::from_params(&params).unwrap();
        for bound in [MAX_AUDIT_BOUND + 1, 1 << 40, u64::MAX / 2 + 1, u64::MAX] {
            assert!(matches!(
                audit(&op, params.base(), bound, 0, 0),
                Err(AlgebraError::InvalidExponent { exponent, .. }) if exponent == bound
            ));
        }
        assert_eq!(audit(&op, params.base(), 2, 0, 0).unwrap().bases_checked, 1);
    }

    #[test]
    fn test_samples_are_reproducible() {
        let op = MultilinearOperator::from_params(&ParameterSet::m3()).unwrap();
        let a = sample_vectors(&op, 9, 3).unwrap();
        assert_eq!(a, sample_vectors(&op, 9, 3).unwrap());
        assert_ne!(a, sample_vectors(&op, 10, 3).unwrap());
    }
}

//! Symbolic evaluation of the product over free indeterminates.
//!
//! Applying `∘` to the free vector `X = (X_0, …, X_{n-1})` yields one
//! polynomial per coordinate.  The growth of `X^k` (distinct monomials and
//! total degree) is the data feed consumed by external analysis tooling;
//! the engine itself never needs it.

use crate::{
    error::{AlgebraError, DimensionError},
    vector::{check_dim, MAX_DIM},
    Field, MultilinearOperator, Vector,
};
use std::collections::{hash_map::Entry, BTreeMap, BTreeSet, HashMap};

/// Exponent vector of a monomial in up to [`MAX_DIM`] variables.
pub type Monomial = [u8; MAX_DIM];

/// Largest exponent [`growth_profile`] accepts; monomial exponents are `u8`.
pub const MAX_SYMBOLIC_EXPONENT: u64 = u8::MAX as u64;

/// A sparse polynomial over `F_p`.
///
/// The representation is canonical: coefficients are reduced and no
/// monomial maps to zero, so structural equality is polynomial equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, u64>,
}

impl Polynomial {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The constant polynomial `c`.
    pub fn constant(field: &Field, c: u64) -> Self {
        let mut poly = Self::zero();
        poly.accumulate(field, [0; MAX_DIM], c);
        poly
    }

    /// The indeterminate `X_index`.
    pub fn variable(index: usize) -> Result<Self, DimensionError> {
        if index >= MAX_DIM {
            return Err(DimensionError::Mismatch {
                expected: MAX_DIM,
                actual: index + 1,
            });
        }
        let mut mono = [0u8; MAX_DIM];
        mono[index] = 1;
        let mut terms = BTreeMap::new();
        terms.insert(mono, 1);
        Ok(Self { terms })
    }

    fn accumulate(&mut self, field: &Field, mono: Monomial, coef: u64) {
        let coef = field.reduce(coef);
        if coef == 0 {
            return;
        }
        let slot = self.terms.entry(mono).or_insert(0);
        *slot = field.add(*slot, coef);
        if *slot == 0 {
            self.terms.remove(&mono);
        }
    }

    /// Returns `true` for the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of monomials with a non-zero coefficient.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Iterates over `(monomial, coefficient)` pairs in lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, u64)> + '_ {
        self.terms.iter().map(|(m, &c)| (m, c))
    }

    /// Total degree, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.terms
            .keys()
            .map(|m| m.iter().map(|&e| e as usize).sum())
            .max()
    }

    /// Sum of two polynomials.
    pub fn add(&self, other: &Polynomial, field: &Field) -> Polynomial {
        let mut out = self.clone();
        for (&mono, &coef) in &other.terms {
            out.accumulate(field, mono, coef);
        }
        out
    }

    /// Multiplies every coefficient by `c`.
    pub fn scale(&self, c: u64, field: &Field) -> Polynomial {
        let mut out = Polynomial::zero();
        for (&mono, &coef) in &self.terms {
            out.accumulate(field, mono, field.mul(coef, c));
        }
        out
    }

    /// Product of two polynomials.
    ///
    /// Fails if a resulting exponent would not fit in a `u8`.
    pub fn mul(&self, other: &Polynomial, field: &Field) -> Result<Polynomial, AlgebraError> {
        let mut out = Polynomial::zero();
        for (lhs, &a) in &self.terms {
            for (rhs, &b) in &other.terms {
                let mut mono = [0u8; MAX_DIM];
                for (slot, (&x, &y)) in mono.iter_mut().zip(lhs.iter().zip(rhs)) {
                    *slot = x.checked_add(y).ok_or_else(|| {
                        AlgebraError::exponent(
                            x as u64 + y as u64,
                            "monomial exponent exceeds symbolic limit",
                        )
                    })?;
                }
                out.accumulate(field, mono, field.mul(a, b));
            }
        }
        Ok(out)
    }

    /// Evaluates the polynomial at `point` (missing variables read as zero).
    pub fn evaluate(&self, field: &Field, point: &[u64]) -> u64 {
        self.terms.iter().fold(0u64, |acc, (mono, &coef)| {
            let value = mono.iter().enumerate().fold(coef, |v, (var, &e)| {
                let x = point.get(var).copied().unwrap_or(0);
                field.mul(v, field.pow(x, e as u64))
            });
            field.add(acc, value)
        })
    }
}

/// A vector of polynomials, one per coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicVector {
    components: Vec<Polynomial>,
}

impl SymbolicVector {
    /// The free vector `(X_0, …, X_{dim-1})`.
    pub fn free(dim: usize) -> Result<Self, DimensionError> {
        check_dim(dim)?;
        let components = (0..dim)
            .map(Polynomial::variable)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }

    /// Lifts a concrete vector to constant polynomials.
    pub fn from_vector(field: &Field, v: &Vector) -> Self {
        Self {
            components: v
                .coords()
                .iter()
                .map(|&c| Polynomial::constant(field, c))
                .collect(),
        }
    }

    /// Dimension `n`.
    pub fn dim(&self) -> usize {
        self.components.len()
    }

    /// Coordinate polynomials.
    pub fn components(&self) -> &[Polynomial] {
        &self.components
    }

    /// Distinct monomials appearing in any coordinate.
    pub fn monomial_count(&self) -> usize {
        self.components
            .iter()
            .flat_map(|p| p.terms.keys())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Highest total degree over all coordinates (0 for the zero vector).
    pub fn degree(&self) -> usize {
        self.components
            .iter()
            .filter_map(Polynomial::degree)
            .max()
            .unwrap_or(0)
    }

    /// Substitutes `point` for the indeterminates.
    pub fn evaluate(&self, field: &Field, point: &[u64]) -> Result<Vector, DimensionError> {
        let coords: Vec<u64> = self
            .components
            .iter()
            .map(|p| p.evaluate(field, point))
            .collect();
        Vector::new(field, &coords)
    }
}

impl MultilinearOperator {
    /// Evaluates `a ∘ b` over polynomial coordinates.
    pub fn apply_symbolic(
        &self,
        a: &SymbolicVector,
        b: &SymbolicVector,
    ) -> Result<SymbolicVector, AlgebraError> {
        let n = self.dim();
        for v in [a, b] {
            if v.dim() != n {
                return Err(DimensionError::Mismatch {
                    expected: n,
                    actual: v.dim(),
                }
                .into());
            }
        }
        let f = self.field();
        let mut products: HashMap<(usize, usize), Polynomial> = HashMap::new();
        let mut out: Vec<Polynomial> = self
            .constant()
            .coords()
            .iter()
            .map(|&c| Polynomial::constant(f, c))
            .collect();
        for t in self.terms() {
            let prod = match products.entry((t.left, t.right)) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => {
                    slot.insert(a.components[t.left].mul(&b.components[t.right], f)?)
                }
            };
            let scaled = prod.scale(t.coef, f);
            out[t.out] = out[t.out].add(&scaled, f);
        }
        for (i, slot) in out.iter_mut().enumerate() {
            for j in 0..n {
                let lhs = a.components[j].scale(self.left_linear(i, j), f);
                let rhs = b.components[j].scale(self.right_linear(i, j), f);
                *slot = slot.add(&lhs, f).add(&rhs, f);
            }
        }
        Ok(SymbolicVector { components: out })
    }
}

/// Size of the symbolic power `X^k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthStats {
    /// The exponent `k`.
    pub exponent: u64,
    /// Distinct monomials across all coordinates.
    pub monomials: usize,
    /// Monomial count of each coordinate.
    pub per_component: Vec<usize>,
    /// Total degree of `X^k`.
    pub degree: usize,
}

/// Computes [`GrowthStats`] for `X^1 … X^max_k` via the defining left fold.
pub fn growth_profile(
    operator: &MultilinearOperator,
    max_k: u64,
) -> Result<Vec<GrowthStats>, AlgebraError> {
    if max_k == 0 || max_k > MAX_SYMBOLIC_EXPONENT {
        return Err(AlgebraError::exponent(
            max_k,
            format!("symbolic exponent must lie in 1..={MAX_SYMBOLIC_EXPONENT}"),
        ));
    }
    let x = SymbolicVector::free(operator.dim())?;
    let mut power = x.clone();
    let mut out = Vec::with_capacity(max_k as usize);
    for k in 1..=max_k {
        if k > 1 {
            power = operator.apply_symbolic(&power, &x)?;
        }
        out.push(GrowthStats {
            exponent: k,
            monomials: power.monomial_count(),
            per_component: power.components.iter().map(Polynomial::num_terms).collect(),
            degree: power.degree(),
        });
    }
    Ok(out)
}

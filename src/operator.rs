//! The non-associative product `a ∘ b` on `F_p^n`.
//!
//! An operator is fixed by a structure tensor `T` and a shift vector `s`.
//! The product is the bilinear map `T` transported along the translation
//! `x ↦ x + s`:
//!
//! ```text
//! a ∘ b = T(a + s, b + s) − s
//!       = T(a, b) + T(a, s) + T(s, b) + (T(s, s) − s)
//! ```
//!
//! With `s = 0` this is the plain bilinear product `(a ∘ b)_i = Σ T[i][j][k]·a_j·b_k`.
//! The translation is an isomorphism onto `(F_p^n, T)`, so every
//! power-associativity property of `T` carries over for any choice of `s`.
//! The affine parts are expanded once at construction; evaluation touches
//! only the non-zero tensor entries.

use crate::{
    error::{AlgebraError, DimensionError, FieldError},
    params::{ParameterSet, StructureTensor},
    vector::MAX_DIM,
    Field, Vector,
};

/// A non-zero tensor entry `T[out][left][right] = coef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BilinearTerm {
    pub(crate) out: usize,
    pub(crate) left: usize,
    pub(crate) right: usize,
    pub(crate) coef: u64,
}

/// One immutable instance of the algebra `(F_p^n, ∘)`.
///
/// The operator owns its parameters by value and never mutates them, so a
/// single instance can be shared by reference across threads and protocol
/// runs.
#[derive(Debug, Clone)]
pub struct MultilinearOperator {
    name: String,
    field: Field,
    tensor: StructureTensor,
    shift: Vector,
    terms: Vec<BilinearTerm>,
    /// `left[i·n + j] = Σ_k T[i][j][k]·s_k`, the coefficient of `a_j` in output `i`.
    left: Vec<u64>,
    /// `right[i·n + k] = Σ_j T[i][j][k]·s_j`, the coefficient of `b_k` in output `i`.
    right: Vec<u64>,
    constant: Vector,
}

impl MultilinearOperator {
    /// Creates an operator from a tensor and a shift over `field`.
    pub fn new(
        name: impl Into<String>,
        field: Field,
        tensor: StructureTensor,
        shift: Vector,
    ) -> Result<Self, AlgebraError> {
        let n = tensor.dim();
        shift.expect_dim(n)?;
        if let Some(&value) = shift.coords().iter().find(|&&c| c >= field.modulus()) {
            return Err(FieldError::OutOfRange {
                value,
                modulus: field.modulus(),
            }
            .into());
        }

        let mut terms = Vec::new();
        let mut left = vec![0u64; n * n];
        let mut right = vec![0u64; n * n];
        let mut constant = [0u64; MAX_DIM];
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let coef = tensor.get(i, j, k);
                    if coef == 0 {
                        continue;
                    }
                    terms.push(BilinearTerm {
                        out: i,
                        left: j,
                        right: k,
                        coef,
                    });
                    let sj = shift.get(j);
                    let sk = shift.get(k);
                    left[i * n + j] = field.add(left[i * n + j], field.mul(coef, sk));
                    right[i * n + k] = field.add(right[i * n + k], field.mul(coef, sj));
                    constant[i] = field.add(constant[i], field.mul(coef, field.mul(sj, sk)));
                }
            }
            constant[i] = field.sub(constant[i], shift.get(i));
        }

        Ok(Self {
            name: name.into(),
            field,
            tensor,
            shift,
            terms,
            left,
            right,
            constant: Vector::from_raw(n, constant),
        })
    }

    /// Builds the operator described by a parameter set.
    pub fn from_params(params: &ParameterSet) -> Result<Self, AlgebraError> {
        Self::new(
            params.name(),
            *params.field(),
            params.tensor().clone(),
            *params.shift(),
        )
    }

    /// Name of the parameter set this operator was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying field.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Vector dimension `n`.
    pub fn dim(&self) -> usize {
        self.tensor.dim()
    }

    /// The structure tensor `T`.
    pub fn tensor(&self) -> &StructureTensor {
        &self.tensor
    }

    /// The shift vector `s`.
    pub fn shift(&self) -> &Vector {
        &self.shift
    }

    pub(crate) fn terms(&self) -> &[BilinearTerm] {
        &self.terms
    }

    pub(crate) fn left_linear(&self, i: usize, j: usize) -> u64 {
        self.left[i * self.dim() + j]
    }

    pub(crate) fn right_linear(&self, i: usize, k: usize) -> u64 {
        self.right[i * self.dim() + k]
    }

    pub(crate) fn constant(&self) -> &Vector {
        &self.constant
    }

    /// Builds a vector of this operator's dimension, reducing into its field.
    pub fn vector(&self, values: &[u64]) -> Result<Vector, DimensionError> {
        if values.len() != self.dim() {
            return Err(DimensionError::Mismatch {
                expected: self.dim(),
                actual: values.len(),
            });
        }
        Vector::new(&self.field, values)
    }

    /// Checks that `v` has this operator's dimension and canonical residues.
    pub fn check_vector(&self, v: &Vector) -> Result<(), AlgebraError> {
        v.expect_dim(self.dim())?;
        let p = self.field.modulus();
        match v.coords().iter().find(|&&c| c >= p) {
            Some(&value) => Err(FieldError::OutOfRange { value, modulus: p }.into()),
            None => Ok(()),
        }
    }

    /// Evaluates `a ∘ b`.
    pub fn apply(&self, a: &Vector, b: &Vector) -> Result<Vector, AlgebraError> {
        let n = self.dim();
        self.check_vector(a)?;
        self.check_vector(b)?;
        let f = &self.field;
        let mut out = [0u64; MAX_DIM];
        out[..n].copy_from_slice(self.constant.coords());
        for t in &self.terms {
            let prod = f.mul(t.coef, f.mul(a.get(t.left), b.get(t.right)));
            out[t.out] = f.add(out[t.out], prod);
        }
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            for j in 0..n {
                *slot = f.add(*slot, f.mul(self.left[i * n + j], a.get(j)));
                *slot = f.add(*slot, f.mul(self.right[i * n + j], b.get(j)));
            }
        }
        Ok(Vector::from_raw(n, out))
    }

    /// Evaluates `a ∘ a`.
    pub fn square(&self, a: &Vector) -> Result<Vector, AlgebraError> {
        self.apply(a, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> MultilinearOperator {
        MultilinearOperator::from_params(&ParameterSet::toy_m3()).unwrap()
    }

    /// `T(x, y)` without any translation.
    fn bilinear(op: &MultilinearOperator, x: &Vector, y: &Vector) -> Vector {
        let f = op.field();
        let n = op.dim();
        let mut out = vec![0u64; n];
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let term = f.mul(op.tensor().get(i, j, k), f.mul(x.get(j), y.get(k)));
                    out[i] = f.add(out[i], term);
                }
            }
        }
        Vector::new(f, &out).unwrap()
    }

    #[test]
    fn test_matches_published_m3_formula() {
        let op = toy();
        let a = op.vector(&[1, 2, 3]).unwrap();
        let b = op.vector(&[5, 6, 7]).unwrap();
        // (ab)_0 = 1 + 5 + 1·5 + 2·2·6 + 5·3·6 + 3·3·7 = 188 ≡ 1
        // (ab)_1 = 2 + 6 + 2·5 + 1·6 + 7·2·6 + 4·2·7 = 164 ≡ 10
        assert_eq!(op.apply(&a, &b).unwrap().coords(), &[1, 10, 0]);
        assert_eq!(op.apply(&b, &a).unwrap().coords(), &[3, 4, 5]);
    }

    #[test]
    fn test_expanded_form_equals_translated_bilinear() {
        for params in [ParameterSet::toy_m3(), ParameterSet::m3(), ParameterSet::m4()] {
            let op = MultilinearOperator::from_params(&params).unwrap();
            let f = *op.field();
            let n = op.dim();
            let a = op.vector(&[3, 1, 4, 1][..n]).unwrap();
            let b = op.vector(&[5, 9, 2, 6][..n]).unwrap();
            let s = *op.shift();
            let direct = bilinear(&op, &a.add(&s, &f).unwrap(), &b.add(&s, &f).unwrap())
                .sub(&s, &f)
                .unwrap();
            assert_eq!(op.apply(&a, &b).unwrap(), direct, "{}", params.name());
        }
    }

    #[test]
    fn test_zero_shift_is_pure_bilinear() {
        let params = ParameterSet::toy_m3();
        let op = MultilinearOperator::new(
            "bilinear",
            *params.field(),
            params.tensor().clone(),
            Vector::zero(3).unwrap(),
        )
        .unwrap();
        let a = op.vector(&[2, 7, 9]).unwrap();
        let b = op.vector(&[4, 0, 10]).unwrap();
        assert_eq!(op.apply(&a, &b).unwrap(), bilinear(&op, &a, &b));
        assert_eq!(op.constant(), &Vector::zero(3).unwrap());
    }

    #[test]
    fn test_zero_is_neutral_for_unit_shift() {
        let op = toy();
        let zero = Vector::zero(3).unwrap();
        let a = op.vector(&[8, 3, 6]).unwrap();
        assert_eq!(op.apply(&zero, &a).unwrap(), a);
        assert_eq!(op.apply(&a, &zero).unwrap(), a);
    }

    #[test]
    fn test_dimension_mismatch() {
        let op = MultilinearOperator::from_params(&ParameterSet::m4()).unwrap();
        let f = *op.field();
        let three = Vector::new(&f, &[1, 2, 3]).unwrap();
        let four = op.vector(&[1, 2, 3, 4]).unwrap();
        assert_eq!(
            op.apply(&three, &four),
            Err(AlgebraError::Dimension(DimensionError::Mismatch {
                expected: 4,
                actual: 3
            }))
        );
        assert!(op.apply(&four, &three).is_err());
        assert!(op.vector(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_rejects_residues_of_a_larger_field() {
        let op = toy();
        let wide = Vector::new(ParameterSet::m3().field(), &[100, 200, 300]).unwrap();
        let small = op.vector(&[1, 2, 3]).unwrap();
        let out_of_range = AlgebraError::Field(FieldError::OutOfRange {
            value: 100,
            modulus: 11,
        });
        assert_eq!(op.check_vector(&wide), Err(out_of_range.clone()));
        assert_eq!(op.apply(&wide, &small), Err(out_of_range.clone()));
        assert_eq!(op.apply(&small, &wide), Err(out_of_range));
        assert!(op.check_vector(&small).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_shift() {
        let params = ParameterSet::toy_m3();
        let err = MultilinearOperator::new(
            "bad",
            *params.field(),
            params.tensor().clone(),
            Vector::zero(4).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, AlgebraError::Dimension(_)));
    }

    #[test]
    fn test_linear_parts_for_unit_shift() {
        // With s = e_0 the unit of T, both linear parts are the identity.
        let op = toy();
        for i in 0..3 {
            for j in 0..3 {
                let expected = u64::from(i == j);
                assert_eq!(op.left_linear(i, j), expected);
                assert_eq!(op.right_linear(i, j), expected);
            }
        }
        assert_eq!(op.terms().len(), 12);
    }
}

//! Structure tensors and named parameter sets.
//!
//! A parameter set is pure configuration: the modulus `p`, the structure
//! tensor `T[i][j][k]`, the shift vector `s` and a recommended public base
//! vector `g`.  Sets are immutable once loaded and are consumed by
//! [`MultilinearOperator::from_params`](crate::MultilinearOperator::from_params).
//!
//! JSON layout (also produced by [`ParameterSet::to_json`]):
//!
//! ```text
//! { "name": "M3", "modulus": 11,
//!   "tensor": [[[..n..], ..n..], ..n..],
//!   "shift": [..n..], "base": [..n..] }
//! ```

use crate::{
    error::{AlgebraError, DimensionError},
    vector::check_dim,
    Field, Vector,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Mersenne prime `2^61 - 1`, the modulus of the shipped sets.
pub const MERSENNE_61: u64 = (1 << 61) - 1;

/// Coefficients `A..E` of the shipped M3 set.
///
/// First five outputs of `derive_many_mod_p(2^61 - 1,
/// b"power_algebra:v1:m3:coefficients", &[], 5)`.
pub const M3_COEFFICIENTS: [u64; 5] = [
    1543893656611204559,
    1409761178638424884,
    1009651801292686170,
    2089707455227965286,
    2181488717393478450,
];

/// Recommended base vector of the shipped M3 set (label `m3:base`).
pub const M3_BASE: [u64; 3] = [
    1718523957495182198,
    2238273897528816667,
    956419316686885713,
];

/// Coefficients `A..I` of the shipped M4 set (label `m4:coefficients`).
pub const M4_COEFFICIENTS: [u64; 9] = [
    1175254479070296136,
    1485915083498951824,
    189195312748972484,
    654954939173275743,
    1932761818531466524,
    1253197094338582187,
    1693806277909343135,
    889793450854581849,
    1982655187850756812,
];

/// Recommended base vector of the shipped M4 set (label `m4:base`).
pub const M4_BASE: [u64; 4] = [
    1207916283954950166,
    2301831839607094433,
    1750411309804719765,
    2195714982783204103,
];

/// Domain labels under which the shipped constants were expanded.
pub const M3_COEFFICIENT_LABEL: &[u8] = b"power_algebra:v1:m3:coefficients";
/// See [`M3_COEFFICIENT_LABEL`].
pub const M3_BASE_LABEL: &[u8] = b"power_algebra:v1:m3:base";
/// See [`M3_COEFFICIENT_LABEL`].
pub const M4_COEFFICIENT_LABEL: &[u8] = b"power_algebra:v1:m4:coefficients";
/// See [`M3_COEFFICIENT_LABEL`].
pub const M4_BASE_LABEL: &[u8] = b"power_algebra:v1:m4:base";

/// The 3-index coefficient array `T[i][j][k]` of a bilinear map `F^n × F^n → F^n`.
///
/// Entries are stored flat in row-major order: `T[i][j][k]` lives at
/// `(i·n + j)·n + k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureTensor {
    dim: usize,
    entries: Vec<u64>,
}

impl StructureTensor {
    /// Wraps `n³` flat entries, reducing each modulo `p`.
    pub fn new(field: &Field, dim: usize, entries: &[u64]) -> Result<Self, DimensionError> {
        check_dim(dim)?;
        let expected = dim * dim * dim;
        if entries.len() != expected {
            return Err(DimensionError::Mismatch {
                expected,
                actual: entries.len(),
            });
        }
        Ok(Self {
            dim,
            entries: entries.iter().map(|&e| field.reduce(e)).collect(),
        })
    }

    /// Builds a tensor from its nested `n × n × n` form.
    pub fn from_nested(field: &Field, nested: &[Vec<Vec<u64>>]) -> Result<Self, DimensionError> {
        let dim = nested.len();
        check_dim(dim)?;
        let mut flat = Vec::with_capacity(dim * dim * dim);
        for plane in nested {
            if plane.len() != dim {
                return Err(DimensionError::Mismatch {
                    expected: dim,
                    actual: plane.len(),
                });
            }
            for row in plane {
                if row.len() != dim {
                    return Err(DimensionError::Mismatch {
                        expected: dim,
                        actual: row.len(),
                    });
                }
                flat.extend_from_slice(row);
            }
        }
        Self::new(field, dim, &flat)
    }

    /// The published three-dimensional shape with coefficients `[A, B, C, D, E]`.
    ///
    /// With shift `e_0` the induced operation is
    ///
    /// ```text
    /// (ab)_0 = a0 + b0 + a0·b0 + A·a1·b1 + C·a2·b1 + B·a2·b2
    /// (ab)_1 = a1 + b1 + a1·b0 + a0·b1 + D·a1·b1 + E·a1·b2
    /// (ab)_2 = a2 + b2 + a2·b0 + a0·b2 + D·a2·b1 + E·a2·b2
    /// ```
    pub fn m3(field: &Field, coefficients: [u64; 5]) -> Self {
        let [a, b, c, d, e] = coefficients.map(|x| field.reduce(x));
        let mut t = Self::blank(3);
        t.put(0, 0, 0, 1);
        t.put(0, 1, 1, a);
        t.put(0, 2, 1, c);
        t.put(0, 2, 2, b);
        for i in 1..3 {
            t.put(i, i, 0, 1);
            t.put(i, 0, i, 1);
            t.put(i, i, 1, d);
            t.put(i, i, 2, e);
        }
        t
    }

    /// The published four-dimensional shape with coefficients `[A, B, C, D, E, F, G, H, I]`.
    ///
    /// ```text
    /// (ab)_0 = a0 + b0 + a0·b0 + A·a1·b1 + E·a3·b1 + B·a2·b2 + D·a1·b2 + F·a3·b2 + C·a3·b3
    /// (ab)_i = a_i + b_i + a_i·b0 + a0·b_i + G·a_i·b1 + H·a_i·b2 + I·a_i·b3     (i = 1, 2, 3)
    /// ```
    pub fn m4(field: &Field, coefficients: [u64; 9]) -> Self {
        let [a, b, c, d, e, f, g, h, i_coef] = coefficients.map(|x| field.reduce(x));
        let mut t = Self::blank(4);
        t.put(0, 0, 0, 1);
        t.put(0, 1, 1, a);
        t.put(0, 3, 1, e);
        t.put(0, 2, 2, b);
        t.put(0, 1, 2, d);
        t.put(0, 3, 2, f);
        t.put(0, 3, 3, c);
        for i in 1..4 {
            t.put(i, i, 0, 1);
            t.put(i, 0, i, 1);
            t.put(i, i, 1, g);
            t.put(i, i, 2, h);
            t.put(i, i, 3, i_coef);
        }
        t
    }

    fn blank(dim: usize) -> Self {
        Self {
            dim,
            entries: vec![0; dim * dim * dim],
        }
    }

    fn put(&mut self, i: usize, j: usize, k: usize, value: u64) {
        let n = self.dim;
        self.entries[(i * n + j) * n + k] = value;
    }

    /// Returns the dimension `n`.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns `T[i][j][k]`.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> u64 {
        let n = self.dim;
        self.entries[(i * n + j) * n + k]
    }

    /// Returns the flat entry table.
    pub fn entries(&self) -> &[u64] {
        &self.entries
    }

    /// Returns the tensor in nested `n × n × n` form.
    pub fn to_nested(&self) -> Vec<Vec<Vec<u64>>> {
        let n = self.dim;
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| (0..n).map(|k| self.get(i, j, k)).collect())
                    .collect()
            })
            .collect()
    }
}

/// Unvalidated on-disk representation of a [`ParameterSet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterFile {
    /// Set name.
    pub name: String,
    /// Field modulus `p`.
    pub modulus: u64,
    /// Structure tensor, nested `n × n × n`.
    pub tensor: Vec<Vec<Vec<u64>>>,
    /// Shift vector `s`.
    pub shift: Vec<u64>,
    /// Recommended base vector `g`.
    pub base: Vec<u64>,
}

/// A complete, validated configuration for one operation instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParameterFile", into = "ParameterFile")]
pub struct ParameterSet {
    name: String,
    field: Field,
    tensor: StructureTensor,
    shift: Vector,
    base: Vector,
}

impl ParameterSet {
    /// Assembles a parameter set, checking that all parts share one dimension.
    pub fn new(
        name: impl Into<String>,
        field: Field,
        tensor: StructureTensor,
        shift: Vector,
        base: Vector,
    ) -> Result<Self, AlgebraError> {
        let dim = tensor.dim();
        shift.expect_dim(dim)?;
        base.expect_dim(dim)?;
        Ok(Self {
            name: name.into(),
            field,
            tensor,
            shift,
            base,
        })
    }

    /// The shipped three-dimensional set over `p = 2^61 - 1`.
    pub fn m3() -> Self {
        let field = mersenne_field();
        Self {
            name: "M3".to_string(),
            tensor: StructureTensor::m3(&field, M3_COEFFICIENTS),
            shift: unit_shift(3),
            base: fixed_vector(&M3_BASE),
            field,
        }
    }

    /// The shipped four-dimensional set over `p = 2^61 - 1`.
    pub fn m4() -> Self {
        let field = mersenne_field();
        Self {
            name: "M4".to_string(),
            tensor: StructureTensor::m4(&field, M4_COEFFICIENTS),
            shift: unit_shift(4),
            base: fixed_vector(&M4_BASE),
            field,
        }
    }

    /// A toy M3 instance over `F_11` with `(A, B, C, D, E) = (2, 3, 5, 7, 4)`
    /// and base `(1, 1, 1)`, small enough to check by hand.
    pub fn toy_m3() -> Self {
        let field = toy_field();
        Self {
            name: "M3-toy".to_string(),
            tensor: StructureTensor::m3(&field, [2, 3, 5, 7, 4]),
            shift: unit_shift(3),
            base: fixed_vector(&[1, 1, 1]),
            field,
        }
    }

    /// Looks up a shipped set by name (`m3`, `m4`, `toy`; case-insensitive).
    pub fn by_name(name: &str) -> Result<Self, AlgebraError> {
        match name.to_ascii_lowercase().as_str() {
            "m3" => Ok(Self::m3()),
            "m4" => Ok(Self::m4()),
            "toy" | "m3-toy" => Ok(Self::toy_m3()),
            other => Err(AlgebraError::Params(format!(
                "unknown parameter set '{other}'"
            ))),
        }
    }

    /// Parses and validates a JSON parameter set.
    pub fn from_json_str(json: &str) -> Result<Self, AlgebraError> {
        serde_json::from_str(json).map_err(|err| AlgebraError::Params(err.to_string()))
    }

    /// Loads a JSON parameter set from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AlgebraError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|err| AlgebraError::Params(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&contents)
    }

    /// Serializes the set to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, AlgebraError> {
        serde_json::to_string_pretty(self).map_err(|err| AlgebraError::Params(err.to_string()))
    }

    /// Human-readable name of the set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field `F_p`.
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

    /// The recommended public base vector `g`.
    pub fn base(&self) -> &Vector {
        &self.base
    }
}

fn mersenne_field() -> Field {
    Field::from_prime(MERSENNE_61)
}

fn toy_field() -> Field {
    Field::from_prime(11)
}

fn unit_shift(dim: usize) -> Vector {
    let mut coords = [0u64; crate::vector::MAX_DIM];
    coords[0] = 1;
    Vector::from_raw(dim, coords)
}

fn fixed_vector(values: &[u64]) -> Vector {
    let mut coords = [0u64; crate::vector::MAX_DIM];
    coords[..values.len()].copy_from_slice(values);
    Vector::from_raw(values.len(), coords)
}

fn canonical(field: &Field, what: &str, values: &[u64]) -> Result<(), AlgebraError> {
    match values.iter().find(|&&v| v >= field.modulus()) {
        Some(v) => Err(AlgebraError::Params(format!(
            "{what} entry {v} is not below modulus {}",
            field.modulus()
        ))),
        None => Ok(()),
    }
}

impl TryFrom<ParameterFile> for ParameterSet {
    type Error = AlgebraError;

    fn try_from(file: ParameterFile) -> Result<Self, Self::Error> {
        let field = Field::new(file.modulus)?;
        for plane in &file.tensor {
            for row in plane {
                canonical(&field, "tensor", row)?;
            }
        }
        canonical(&field, "shift", &file.shift)?;
        canonical(&field, "base", &file.base)?;
        let tensor = StructureTensor::from_nested(&field, &file.tensor)?;
        let shift = Vector::new(&field, &file.shift)?;
        let base = Vector::new(&field, &file.base)?;
        ParameterSet::new(file.name, field, tensor, shift, base)
    }
}

impl From<ParameterSet> for ParameterFile {
    fn from(set: ParameterSet) -> Self {
        ParameterFile {
            tensor: set.tensor.to_nested(),
            shift: set.shift.coords().to_vec(),
            base: set.base.coords().to_vec(),
            modulus: set.field.modulus(),
            name: set.name,
        }
    }
}

//! Exponentiation `a^k` by repeated self-application.
//!
//! Powers are defined by the left fold `a^1 = a`, `a^(k+1) = a^k ∘ a`.
//! Because the shipped operations are power-associative
//! (`a^m ∘ a^n = a^(m+n)`) and powers of one base commute, `a^k` can be
//! assembled from the binary expansion of `k` exactly as in modular fast
//! exponentiation, using `O(log k)` operator evaluations.  There is no
//! identity element to seed the accumulator, so it starts empty and takes
//! the first selected square directly.

use crate::{error::AlgebraError, MultilinearOperator, Vector};
use log::trace;

/// Which step of the square-and-multiply loop produced a trace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStep {
    /// `base ← base ∘ base`.
    Square,
    /// `acc ← acc ∘ base`.
    Accumulate,
    /// First set bit: `acc ← base` without an evaluation.
    Seed,
}

/// One intermediate vector of a power computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    /// The step that produced `value`.
    pub step: TraceStep,
    /// The exponent `e` such that `value = a^e`.
    pub exponent: u64,
    /// The intermediate vector.
    pub value: Vector,
}

/// Intermediate values produced while computing `a^k`.
///
/// Traces are handed back to the caller and never retained by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerTrace {
    entries: Vec<TraceEntry>,
    evaluations: usize,
}

impl PowerTrace {
    /// The recorded entries in execution order.
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Number of operator evaluations performed.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn record(&mut self, step: TraceStep, exponent: u64, value: Vector) {
        if step != TraceStep::Seed {
            self.evaluations += 1;
        }
        self.entries.push(TraceEntry {
            step,
            exponent,
            value,
        });
    }
}

/// Computes powers under a borrowed operator.
#[derive(Debug, Clone, Copy)]
pub struct PowerEngine<'a> {
    operator: &'a MultilinearOperator,
}

impl<'a> PowerEngine<'a> {
    /// Wraps an operator.
    pub fn new(operator: &'a MultilinearOperator) -> Self {
        Self { operator }
    }

    /// The operator powers are taken under.
    pub fn operator(&self) -> &'a MultilinearOperator {
        self.operator
    }

    /// Computes `a^k` in `O(log k)` operator evaluations.
    pub fn power(&self, a: &Vector, k: u64) -> Result<Vector, AlgebraError> {
        self.run(a, k, None)
    }

    /// Computes `a^k` and returns every intermediate vector.
    pub fn power_with_trace(
        &self,
        a: &Vector,
        k: u64,
    ) -> Result<(Vector, PowerTrace), AlgebraError> {
        let mut trace = PowerTrace::default();
        let value = self.run(a, k, Some(&mut trace))?;
        Ok((value, trace))
    }

    /// Computes `a^k` by the defining left fold, `k − 1` evaluations.
    pub fn power_naive(&self, a: &Vector, k: u64) -> Result<Vector, AlgebraError> {
        check_exponent(k)?;
        self.operator.check_vector(a)?;
        let mut acc = *a;
        for _ in 1..k {
            acc = self.operator.apply(&acc, a)?;
        }
        Ok(acc)
    }

    /// Returns `[a^1, a^2, …, a^k]` by the defining left fold.
    pub fn power_sequence(&self, a: &Vector, k: u64) -> Result<Vec<Vector>, AlgebraError> {
        check_exponent(k)?;
        self.operator.check_vector(a)?;
        let mut out = Vec::new();
        usize::try_from(k)
            .ok()
            .and_then(|len| out.try_reserve_exact(len).ok())
            .ok_or_else(|| AlgebraError::exponent(k, "power sequence does not fit in memory"))?;
        let mut acc = *a;
        out.push(acc);
        for _ in 1..k {
            acc = self.operator.apply(&acc, a)?;
            out.push(acc);
        }
        Ok(out)
    }

    fn run(
        &self,
        a: &Vector,
        k: u64,
        mut trace: Option<&mut PowerTrace>,
    ) -> Result<Vector, AlgebraError> {
        check_exponent(k)?;
        self.operator.check_vector(a)?;

        let mut acc: Option<(Vector, u64)> = None;
        let mut base = *a;
        let mut base_exp = 1u64;
        let mut rest = k;
        loop {
            if rest & 1 == 1 {
                let (next, step) = match acc {
                    None => ((base, base_exp), TraceStep::Seed),
                    Some((value, exp)) => (
                        (self.operator.apply(&value, &base)?, exp + base_exp),
                        TraceStep::Accumulate,
                    ),
                };
                trace!("power step {:?}: a^{}", step, next.1);
                if let Some(t) = trace.as_deref_mut() {
                    t.record(step, next.1, next.0);
                }
                acc = Some(next);
            }
            rest >>= 1;
            if rest == 0 {
                break;
            }
            base = self.operator.square(&base)?;
            base_exp <<= 1;
            trace!("power step Square: a^{base_exp}");
            if let Some(t) = trace.as_deref_mut() {
                t.record(TraceStep::Square, base_exp, base);
            }
        }
        // k ≥ 1 guarantees at least one set bit.
        acc.map(|(value, _)| value)
            .ok_or_else(|| AlgebraError::exponent(k, "exponent has no set bits"))
    }
}

fn check_exponent(k: u64) -> Result<(), AlgebraError> {
    if k == 0 {
        return Err(AlgebraError::exponent(
            k,
            "exponent must be a positive integer (the algebra has no guaranteed identity)",
        ));
    }
    Ok(())
}

//! Pluggable objective functions.
//!
//! Two families exist. Interval-sampled functions evaluate a real value
//! decoded from the whole chromosome. Chromosome-field functions split the
//! bit string into fixed-width fields and score those directly, never going
//! through the interval decode. Asking a function for the mode it does not
//! support fails with [`UnsupportedModeError`].

use crate::codec::{self, InvalidChromosomeError, InvalidParameterError};
use crate::models::Individual;
use serde::Serialize;
use tracing::instrument;

/// How a fitness function consumes a candidate solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// The chromosome is decoded to a real value first.
    RealValued,
    /// The function reads the raw bit string itself.
    Chromosome,
}

#[derive(Debug, thiserror::Error)]
#[error("fitness function `{function}` does not support {mode} evaluation")]
pub struct UnsupportedModeError {
    function: &'static str,
    mode: &'static str,
}

impl UnsupportedModeError {
    fn real_valued(function: &'static str) -> Self {
        Self {
            function,
            mode: "real-valued",
        }
    }

    fn chromosome(function: &'static str) -> Self {
        Self {
            function,
            mode: "raw-chromosome",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    #[error(transparent)]
    UnsupportedMode(#[from] UnsupportedModeError),
    #[error(transparent)]
    Chromosome(#[from] InvalidChromosomeError),
    #[error(transparent)]
    Parameter(#[from] InvalidParameterError),
}

/// Objective function under maximization.
///
/// Besides evaluation, each function reports its theoretical optimum and the
/// input at which it is attained. Those two values feed convergence detection
/// and metrics only; the search itself never looks at them.
pub trait FitnessFunction: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn mode(&self) -> EvaluationMode {
        EvaluationMode::RealValued
    }

    /// Evaluates a decoded real value.
    fn evaluate(&self, _x: f64) -> Result<f64, FunctionError> {
        Err(UnsupportedModeError::real_valued(self.name()).into())
    }

    /// Evaluates a raw chromosome.
    fn evaluate_chromosome(&self, _bits: &str) -> Result<f64, FunctionError> {
        Err(UnsupportedModeError::chromosome(self.name()).into())
    }

    /// Theoretical maximum fitness.
    fn optimal_value(&self) -> f64;

    /// The input (real value, or fitness for chromosome-mode functions) at
    /// which the optimum is attained.
    fn target_input(&self) -> f64;

    /// Chromosome length this function forces on the run, if any.
    fn chromosome_length_override(&self) -> Option<usize> {
        None
    }

    /// Whether one individual counts as converged. Interval-sampled functions
    /// use closeness of `|x|` to the target; chromosome-field functions
    /// compare fitness against `target_input * threshold`. The two policies
    /// are deliberately kept separate.
    fn meets_convergence(&self, individual: &Individual, _threshold: f64) -> bool {
        (individual.real_value.abs() - self.target_input()).abs() < 0.1
    }
}

/// `f(x) = x² + 2x + 5`, maximal at the upper edge of the default interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadratic;

impl FitnessFunction for Quadratic {
    fn name(&self) -> &'static str {
        "quadratic"
    }

    fn evaluate(&self, x: f64) -> Result<f64, FunctionError> {
        Ok(x * x + 2.0 * x + 5.0)
    }

    fn optimal_value(&self) -> f64 {
        173.0
    }

    fn target_input(&self) -> f64 {
        12.0
    }
}

/// `f(x) = (x² − 1)²`, maximal at `x = ±3`; convergence treats the two
/// optima symmetrically via `|x|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quartic;

impl FitnessFunction for Quartic {
    fn name(&self) -> &'static str {
        "quartic"
    }

    fn evaluate(&self, x: f64) -> Result<f64, FunctionError> {
        Ok((x * x - 1.0).powi(2))
    }

    fn optimal_value(&self) -> f64 {
        64.0
    }

    fn target_input(&self) -> f64 {
        3.0
    }
}

/// How a field's normalized value enters the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    /// `(real - min) / (max - min)`
    Normalized,
    /// The decoded real value is already in `[0, 1]`.
    Raw,
    /// `1 - normalized`; more of this field is worse.
    Inverted,
}

struct ProfileField {
    name: &'static str,
    width: usize,
    min: f64,
    max: f64,
    weight: f64,
    kind: FieldKind,
}

/// The field table is ordered: field order determines bit offsets.
const PROFILE_FIELDS: [ProfileField; 5] = [
    ProfileField {
        name: "income",
        width: 8,
        min: 5_000.0,
        max: 100_000.0,
        weight: 0.30,
        kind: FieldKind::Normalized,
    },
    ProfileField {
        name: "age",
        width: 6,
        min: 18.0,
        max: 70.0,
        weight: 0.10,
        kind: FieldKind::Normalized,
    },
    ProfileField {
        name: "credit_history",
        width: 6,
        min: 0.0,
        max: 1.0,
        weight: 0.25,
        kind: FieldKind::Raw,
    },
    ProfileField {
        name: "debt",
        width: 7,
        min: 0.0,
        max: 100.0,
        weight: 0.20,
        kind: FieldKind::Inverted,
    },
    ProfileField {
        name: "savings",
        width: 7,
        min: 0.0,
        max: 100.0,
        weight: 0.15,
        kind: FieldKind::Normalized,
    },
];

/// Total width of the credit chromosome: 8 + 6 + 6 + 7 + 7.
pub const CREDIT_CHROMOSOME_LENGTH: usize = 34;

/// Risk classification of a decoded credit profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskBand {
    VeryLow,
    Low,
    Medium,
    High,
}

/// Decoded view of a credit chromosome, for presentation by external layers.
#[derive(Debug, Clone, Serialize)]
pub struct CreditProfile {
    pub income: f64,
    pub age: f64,
    pub history: f64,
    pub debt: f64,
    pub savings: f64,
    pub fitness: f64,
}

impl CreditProfile {
    pub fn risk_band(&self) -> RiskBand {
        if self.fitness >= 0.81 {
            RiskBand::VeryLow
        } else if self.fitness >= 0.61 {
            RiskBand::Low
        } else if self.fitness >= 0.31 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }
}

/// Credit-scoring fitness over a 34-bit field chromosome.
///
/// Each field is decoded against its own range and contributes its weighted
/// normalized value; debt contributes inverted, credit history enters as the
/// decoded value itself. Fitness lands in `[0, 1]` with optimum 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditScore;

impl CreditScore {
    fn field_values(bits: &str) -> Result<[f64; 5], FunctionError> {
        // Field offsets slice by byte, so non-binary input must be rejected
        // before any slicing happens.
        if !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(InvalidChromosomeError::NonBinary(bits.to_string()).into());
        }
        if bits.len() != CREDIT_CHROMOSOME_LENGTH {
            return Err(InvalidChromosomeError::WrongWidth {
                expected: CREDIT_CHROMOSOME_LENGTH,
                actual: bits.len(),
            }
            .into());
        }

        let mut reals = [0.0; 5];
        let mut offset = 0;
        for (i, field) in PROFILE_FIELDS.iter().enumerate() {
            let segment = &bits[offset..offset + field.width];
            offset += field.width;

            let value = codec::decode_to_integer(segment)?;
            reals[i] = codec::decode_to_real(value, field.min, field.max, field.width)?;
        }

        Ok(reals)
    }

    fn fitness_of(reals: &[f64; 5]) -> f64 {
        let mut total = 0.0;
        for (real, field) in reals.iter().zip(PROFILE_FIELDS.iter()) {
            let mut fi = (real - field.min) / (field.max - field.min);
            if !fi.is_finite() {
                fi = 0.0;
            }
            if field.kind == FieldKind::Raw {
                fi = *real;
            }

            let contribution = match field.kind {
                FieldKind::Inverted => 1.0 - fi,
                _ => fi,
            };
            total += contribution * field.weight;
        }
        total
    }

    /// Decodes a full profile, including per-field real values and fitness.
    #[instrument(level = "debug", skip(self))]
    pub fn decode_profile(&self, bits: &str) -> Result<CreditProfile, FunctionError> {
        let reals = Self::field_values(bits)?;
        Ok(CreditProfile {
            income: reals[0],
            age: reals[1],
            history: reals[2],
            debt: reals[3],
            savings: reals[4],
            fitness: Self::fitness_of(&reals),
        })
    }
}

impl FitnessFunction for CreditScore {
    fn name(&self) -> &'static str {
        "credit"
    }

    fn mode(&self) -> EvaluationMode {
        EvaluationMode::Chromosome
    }

    fn evaluate_chromosome(&self, bits: &str) -> Result<f64, FunctionError> {
        let reals = Self::field_values(bits)?;
        Ok(Self::fitness_of(&reals))
    }

    fn optimal_value(&self) -> f64 {
        1.0
    }

    fn target_input(&self) -> f64 {
        1.0
    }

    fn chromosome_length_override(&self) -> Option<usize> {
        Some(CREDIT_CHROMOSOME_LENGTH)
    }

    fn meets_convergence(&self, individual: &Individual, threshold: f64) -> bool {
        individual.fitness >= self.target_input() * threshold
    }
}

use crate::codec;
use crate::models::{EvaluationMode, FitnessFunction, FunctionError, RunContext};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One candidate solution in one generation.
///
/// Immutable once built. `real_value` is 0.0 for chromosome-mode fitness
/// functions, which never decode the bit string onto an interval. `fitness`
/// is always finite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Individual {
    pub chromosome: String,
    pub real_value: f64,
    pub fitness: f64,
    /// 0-based index of the generation that produced this individual.
    pub generation: usize,
}

impl Individual {
    /// Normalizes a bit string to the run length, decodes it and evaluates it
    /// under the active fitness function.
    #[instrument(level = "trace", skip(ctx, function), fields(function = function.name()))]
    pub(crate) fn evaluate(
        bits: &str,
        ctx: &RunContext,
        function: &dyn FitnessFunction,
        generation: usize,
    ) -> Result<Self, FunctionError> {
        let chromosome = codec::normalize(bits, ctx.chromosome_length);

        match function.mode() {
            EvaluationMode::Chromosome => {
                let fitness = function.evaluate_chromosome(&chromosome)?;
                Ok(Self {
                    chromosome,
                    real_value: 0.0,
                    fitness,
                    generation,
                })
            }
            EvaluationMode::RealValued => {
                let value = codec::decode_to_integer(&chromosome)?;
                let real_value =
                    codec::decode_to_real(value, ctx.xmin, ctx.xmax, ctx.chromosome_length)?;
                let fitness = function.evaluate(real_value)?;
                Ok(Self {
                    chromosome,
                    real_value,
                    fitness,
                    generation,
                })
            }
        }
    }
}

/// Evaluates a pool of bit strings into one generation, ranked by fitness
/// descending. The sort is stable, so ties keep encounter order and index 0
/// is always a maximal element.
pub(crate) fn build_ranked_generation(
    pool: &[String],
    ctx: &RunContext,
    function: &dyn FitnessFunction,
    generation: usize,
) -> Result<Vec<Individual>, FunctionError> {
    let mut individuals = pool
        .iter()
        .map(|bits| Individual::evaluate(bits, ctx, function, generation))
        .collect::<Result<Vec<_>, _>>()?;

    individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

    Ok(individuals)
}

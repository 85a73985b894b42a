//! Evolution driver.
//!
//! The engine resolves a [`RunConfig`]'s strategy keys against a
//! [`Registry`], builds the initial generation, and then breeds ranked
//! generations until the population converges or the generation budget is
//! spent. Every generation is recorded in the returned [`Run`], so callers
//! can inspect the full history and compute metrics over it.

use crate::codec::InvalidParameterError;
use crate::metrics;
use crate::models::{
    Crossover, EmptyPopulationError, FitnessFunction, FunctionError, Individual,
    LengthMismatchError, Mutation, NotConfiguredError, PopulationSource, RunContext, Selector,
    build_ranked_generation,
};
use crate::registry::{Registry, UnknownStrategyError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Strategy(#[from] UnknownStrategyError),
    #[error(transparent)]
    Parameter(#[from] InvalidParameterError),
    #[error(transparent)]
    Function(#[from] FunctionError),
    #[error(transparent)]
    NotConfigured(#[from] NotConfiguredError),
    #[error(transparent)]
    EmptyPopulation(#[from] EmptyPopulationError),
    #[error(transparent)]
    LengthMismatch(#[from] LengthMismatchError),
}

fn default_convergence_threshold() -> f64 {
    0.8
}

/// Serialized description of one evolution run.
///
/// Strategy fields are registry keys; `population_source` is `"random"`
/// (uses `population_size`) or `"file"` (uses `seed_chromosomes`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub function: String,
    pub selection: String,
    pub crossover: String,
    pub mutation: String,
    pub population_source: String,
    #[serde(default)]
    pub population_size: usize,
    #[serde(default)]
    pub seed_chromosomes: Vec<String>,
    pub xmin: f64,
    pub xmax: f64,
    pub chromosome_length: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Maximum number of generations a run may hold, counting the initial
    /// one.
    pub generations: usize,
    /// Fraction of the population that must satisfy the function's
    /// convergence criterion to stop early.
    #[serde(default = "default_convergence_threshold")]
    pub convergence_threshold: f64,
    /// Fixed RNG seed for reproducible runs; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RunConfig {
    fn validate(&self) -> Result<(), InvalidParameterError> {
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("convergence_threshold", self.convergence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidParameterError::RateOutOfRange { name, value });
            }
        }
        if self.generations == 0 {
            return Err(InvalidParameterError::NoGenerations);
        }

        Ok(())
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Enough of the population met the convergence criterion at this
    /// generation index.
    Converged { generation: usize },
    /// The generation budget ran out first.
    Exhausted,
}

/// Complete history of one finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Every generation in order, each ranked by fitness descending.
    pub generations: Vec<Vec<Individual>>,
    pub outcome: Outcome,
}

impl Run {
    /// Fittest individual of the final generation.
    pub fn best(&self) -> Option<&Individual> {
        self.generations.last().and_then(|generation| generation.first())
    }
}

/// Shared generation counter for observing a run from another thread.
#[derive(Debug, Clone, Default)]
pub struct Progress(Arc<AtomicUsize>);

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of breeding steps completed so far.
    pub fn completed(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    fn record(&self, completed: usize) {
        self.0.store(completed, Ordering::Release);
    }
}

/// Runs evolutions against a strategy registry.
pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs an evolution to completion.
    pub fn run(&self, config: &RunConfig) -> Result<Run, Error> {
        self.run_tracked(config, &Progress::new())
    }

    /// Runs an evolution, publishing each completed breeding step to
    /// `progress`.
    #[instrument(
        level = "info",
        skip(self, config, progress),
        fields(
            function = %config.function,
            selection = %config.selection,
            crossover = %config.crossover,
            mutation = %config.mutation,
            generations = config.generations,
        )
    )]
    pub fn run_tracked(&self, config: &RunConfig, progress: &Progress) -> Result<Run, Error> {
        config.validate()?;

        let function = self.registry.function(&config.function)?;
        let selector = self.registry.selector(&config.selection)?;
        let crossover = self.registry.crossover(&config.crossover)?;
        let mutation = self.registry.mutation(&config.mutation)?;

        // Chromosome-field functions dictate their own bit width.
        let length = function
            .chromosome_length_override()
            .unwrap_or(config.chromosome_length);
        let ctx = RunContext::new(config.xmin, config.xmax, length)?;
        let source = resolve_population_source(config)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let pool = source.generate(ctx.chromosome_length, &mut rng)?;
        let mut generations = vec![build_ranked_generation(
            &pool,
            &ctx,
            function.as_ref(),
            0,
        )?];

        let outcome = loop {
            let current = &generations[generations.len() - 1];
            let converged =
                converged_fraction(current, function.as_ref(), config.convergence_threshold);
            tracing::debug!(
                generation = generations.len() - 1,
                best_fitness = current[0].fitness,
                converged_fraction = converged,
                "generation built"
            );

            if converged >= config.convergence_threshold {
                break Outcome::Converged {
                    generation: generations.len() - 1,
                };
            }
            if generations.len() >= config.generations {
                break Outcome::Exhausted;
            }

            let next = breed(
                current,
                &ctx,
                function.as_ref(),
                &selector,
                &crossover,
                &mutation,
                config,
                &mut rng,
            )?;
            generations.push(next);
            progress.record(generations.len() - 1);
        };

        let run = Run {
            generations,
            outcome,
        };
        log_run(&run, function.as_ref(), config.convergence_threshold);

        Ok(run)
    }
}

fn resolve_population_source(config: &RunConfig) -> Result<PopulationSource, Error> {
    match config.population_source.as_str() {
        "random" => Ok(PopulationSource::random(config.population_size)?),
        "file" => Ok(PopulationSource::seeded(config.seed_chromosomes.clone())?),
        other => Err(UnknownStrategyError {
            kind: "population source",
            key: other.to_string(),
        }
        .into()),
    }
}

/// Breeds one ranked generation into the next, same size, ranked again.
#[allow(clippy::too_many_arguments)]
fn breed<R: Rng>(
    current: &[Individual],
    ctx: &RunContext,
    function: &dyn FitnessFunction,
    selector: &Selector,
    crossover: &Crossover,
    mutation: &Mutation,
    config: &RunConfig,
    rng: &mut R,
) -> Result<Vec<Individual>, Error> {
    let population_size = current.len();
    let num_pairs = (population_size + 1) / 2;
    let pairs = selector.select_pairs(current, num_pairs, ctx, function, rng)?;

    let mut offspring = Vec::with_capacity(num_pairs * 2);
    for (parent1, parent2) in &pairs {
        // The crossover rate gates recombination per pair; unrecombined
        // pairs pass their chromosomes through to mutation unchanged.
        let (child1, child2) = if rng.random_bool(config.crossover_rate) {
            let (child1, child2, cut) =
                crossover.apply(rng, &parent1.chromosome, &parent2.chromosome)?;
            tracing::debug!(?cut, "pair recombined");
            (child1, child2)
        } else {
            (parent1.chromosome.clone(), parent2.chromosome.clone())
        };

        offspring.push(mutation.apply(rng, &child1, config.mutation_rate));
        offspring.push(mutation.apply(rng, &child2, config.mutation_rate));
    }

    resize_pool(&mut offspring, population_size, &current[0].chromosome);

    let next_index = current[0].generation + 1;
    Ok(build_ranked_generation(
        &offspring,
        ctx,
        function,
        next_index,
    )?)
}

/// Forces a bred pool back to the population size. Overflow drops from the
/// back; shortfall repeats the first chromosome, falling back to `filler`
/// when the pool is empty.
pub(crate) fn resize_pool(pool: &mut Vec<String>, target: usize, filler: &str) {
    pool.truncate(target);

    if pool.len() < target {
        let pad = pool
            .first()
            .cloned()
            .unwrap_or_else(|| filler.to_string());
        while pool.len() < target {
            pool.push(pad.clone());
        }
    }
}

/// Fraction of a generation meeting the function's convergence criterion.
fn converged_fraction(
    generation: &[Individual],
    function: &dyn FitnessFunction,
    threshold: f64,
) -> f64 {
    if generation.is_empty() {
        return 0.0;
    }

    let converged = generation
        .iter()
        .filter(|individual| function.meets_convergence(individual, threshold))
        .count();

    converged as f64 / generation.len() as f64
}

fn log_run(run: &Run, function: &dyn FitnessFunction, threshold: f64) {
    let best_fitness = run.best().map(|individual| individual.fitness);
    let final_converged = run
        .generations
        .last()
        .map(|generation| converged_fraction(generation, function, threshold))
        .unwrap_or(0.0);
    tracing::info!(
        outcome = ?run.outcome,
        generations = run.generations.len(),
        best_fitness,
        final_converged_fraction = final_converged,
        generation_at_90_percent =
            ?metrics::generation_at_90_percent(&run.generations, function.optimal_value()),
        average_diversity = metrics::average_diversity(&run.generations),
        "evolution finished"
    );
}

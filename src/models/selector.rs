//! Parent selection strategies.
//!
//! A selector turns one ranked generation into a list of parent pairs for
//! breeding. Two methods are supported:
//!
//! - **Roulette** draws each parent with probability proportional to its
//!   fitness. A generation whose total fitness is zero or negative cannot be
//!   sampled proportionally, so the wheel falls back to a uniform pick
//!   instead of dividing by zero.
//! - **Tournament** draws a small uniform sample (size 3, or the whole
//!   population when smaller) and keeps its fittest member. Odd-sized
//!   populations get one freshly generated, fully evaluated random entrant
//!   added to the sampling pool per pair draw; the entrant is discarded
//!   afterwards and never joins the real population.

use crate::models::population::random_chromosome;
use crate::models::{FitnessFunction, FunctionError, Individual, RunContext};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Degenerate fitness distributions can pin the wheel on a single index, so
/// parent-2 distinctness is best effort with a bounded number of redraws.
const MAX_PARENT_REDRAWS: usize = 8;

/// Spins the roulette wheel once and returns the selected index.
fn spin_roulette<R: Rng>(generation: &[Individual], total_fitness: f64, rng: &mut R) -> usize {
    if total_fitness <= 0.0 {
        // All-nonpositive fitness: fall back to a uniform pick.
        return rng.random_range(0..generation.len());
    }

    let spin = rng.random_range(0.0..total_fitness);
    let mut cumulative = 0.0;

    for (index, individual) in generation.iter().enumerate() {
        cumulative += individual.fitness;
        if spin <= cumulative {
            return index;
        }
    }

    generation.len() - 1
}

#[instrument(level = "debug", skip(generation, rng), fields(num_pairs = num_pairs, population = generation.len()))]
fn roulette_selection<R: Rng>(
    generation: &[Individual],
    num_pairs: usize,
    rng: &mut R,
) -> Vec<(Individual, Individual)> {
    let total_fitness: f64 = generation.iter().map(|i| i.fitness).sum();
    let mut pairs = Vec::with_capacity(num_pairs);

    for _ in 0..num_pairs {
        let parent1 = spin_roulette(generation, total_fitness, rng);
        let mut parent2 = spin_roulette(generation, total_fitness, rng);

        let mut redraws = 0;
        while parent2 == parent1 && generation.len() > 1 && redraws < MAX_PARENT_REDRAWS {
            parent2 = spin_roulette(generation, total_fitness, rng);
            redraws += 1;
        }

        pairs.push((generation[parent1].clone(), generation[parent2].clone()));
    }

    pairs
}

#[instrument(level = "debug", skip(generation, ctx, function, rng), fields(num_pairs = num_pairs, population = generation.len()))]
fn tournament_selection<R: Rng>(
    generation: &[Individual],
    num_pairs: usize,
    ctx: &RunContext,
    function: &dyn FitnessFunction,
    rng: &mut R,
) -> Result<Vec<(Individual, Individual)>, FunctionError> {
    let tournament_size = generation.len().min(3);
    let odd_population = generation.len() % 2 == 1;
    let mut pairs = Vec::with_capacity(num_pairs);

    for _ in 0..num_pairs {
        // The extra entrant keeps draws over an even pool; it lives for this
        // pair draw only.
        let extra = if odd_population {
            let bits = random_chromosome(ctx.chromosome_length, rng);
            Some(Individual::evaluate(
                &bits,
                ctx,
                function,
                generation[0].generation,
            )?)
        } else {
            None
        };

        let parent1 = run_tournament(generation, extra.as_ref(), tournament_size, rng);
        let parent2 = run_tournament(generation, extra.as_ref(), tournament_size, rng);
        pairs.push((parent1.clone(), parent2.clone()));
    }

    Ok(pairs)
}

/// Uniform sample with replacement over the pool; returns its fittest member.
fn run_tournament<'a, R: Rng>(
    generation: &'a [Individual],
    extra: Option<&'a Individual>,
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual {
    let pool_size = generation.len() + usize::from(extra.is_some());
    let candidate = |index: usize| -> &Individual {
        if index < generation.len() {
            &generation[index]
        } else {
            // Index beyond the generation can only occur when extra exists.
            extra.unwrap_or(&generation[0])
        }
    };

    let mut best = candidate(rng.random_range(0..pool_size));
    for _ in 1..tournament_size {
        let contender = candidate(rng.random_range(0..pool_size));
        if contender.fitness > best.fitness {
            best = contender;
        }
    }

    best
}

/// Parent-pair selection strategy over one generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Selector {
    /// Fitness-proportional selection with a uniform fallback for
    /// all-nonpositive fitness.
    Roulette,
    /// Best-of-3 tournaments (smaller when the population is smaller).
    Tournament,
}

impl Selector {
    /// Selects `num_pairs` parent pairs from a ranked generation.
    #[instrument(level = "debug", skip(self, generation, ctx, function, rng), fields(method = ?self, num_pairs = num_pairs))]
    pub(crate) fn select_pairs<R: Rng>(
        &self,
        generation: &[Individual],
        num_pairs: usize,
        ctx: &RunContext,
        function: &dyn FitnessFunction,
        rng: &mut R,
    ) -> Result<Vec<(Individual, Individual)>, FunctionError> {
        if generation.is_empty() {
            return Ok(Vec::new());
        }

        match self {
            Self::Roulette => Ok(roulette_selection(generation, num_pairs, rng)),
            Self::Tournament => tournament_selection(generation, num_pairs, ctx, function, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quadratic;
    use rand::{SeedableRng, rngs::StdRng};

    const TOLERANCE: f64 = 0.07;

    fn individual(chromosome: &str, fitness: f64) -> Individual {
        Individual {
            chromosome: chromosome.to_string(),
            real_value: 0.0,
            fitness,
            generation: 0,
        }
    }

    fn test_context() -> RunContext {
        RunContext::new(0.0, 15.0, 4).unwrap()
    }

    #[test]
    fn roulette_is_roughly_proportional() {
        let generation = vec![
            individual("0001", 0.1),
            individual("0010", 0.3),
            individual("0011", 0.6),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let mut counts = [0usize; 3];
        for _ in 0..1000 {
            let index = spin_roulette(&generation, 1.0, &mut rng);
            counts[index] += 1;
        }

        assert!((counts[0] as f64 / 1000.0 - 0.1).abs() < TOLERANCE);
        assert!((counts[1] as f64 / 1000.0 - 0.3).abs() < TOLERANCE);
        assert!((counts[2] as f64 / 1000.0 - 0.6).abs() < TOLERANCE);
    }

    #[test]
    fn roulette_falls_back_to_uniform_on_zero_total_fitness() {
        let generation = vec![
            individual("0000", 0.0),
            individual("0001", 0.0),
            individual("0010", 0.0),
        ];
        let ctx = test_context();
        let mut rng = StdRng::seed_from_u64(42);

        let pairs = Selector::Roulette
            .select_pairs(&generation, 4, &ctx, &Quadratic, &mut rng)
            .unwrap();

        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn roulette_self_pairs_a_single_individual() {
        let generation = vec![individual("1111", 260.0)];
        let ctx = test_context();
        let mut rng = StdRng::seed_from_u64(42);

        let pairs = Selector::Roulette
            .select_pairs(&generation, 1, &ctx, &Quadratic, &mut rng)
            .unwrap();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.chromosome, "1111");
        assert_eq!(pairs[0].1.chromosome, "1111");
    }

    #[test]
    fn roulette_returns_members_of_the_generation() {
        let generation = vec![
            individual("0001", 1.0),
            individual("0010", 2.0),
            individual("0011", 3.0),
            individual("0100", 4.0),
        ];
        let ctx = test_context();
        let mut rng = StdRng::seed_from_u64(3);

        let pairs = Selector::Roulette
            .select_pairs(&generation, 2, &ctx, &Quadratic, &mut rng)
            .unwrap();

        for (p1, p2) in &pairs {
            assert!(generation.iter().any(|i| i.chromosome == p1.chromosome));
            assert!(generation.iter().any(|i| i.chromosome == p2.chromosome));
        }
    }

    #[test]
    fn tournament_selects_from_an_even_population() {
        let generation = vec![
            individual("0001", 1.0),
            individual("0010", 2.0),
            individual("0011", 3.0),
            individual("0100", 4.0),
        ];
        let ctx = test_context();
        let mut rng = StdRng::seed_from_u64(42);

        let pairs = Selector::Tournament
            .select_pairs(&generation, 2, &ctx, &Quadratic, &mut rng)
            .unwrap();

        assert_eq!(pairs.len(), 2);
        for (p1, p2) in &pairs {
            assert!(generation.iter().any(|i| i.chromosome == p1.chromosome));
            assert!(generation.iter().any(|i| i.chromosome == p2.chromosome));
        }
    }

    #[test]
    fn tournament_handles_an_odd_population() {
        let generation = vec![
            individual("0001", 1.0),
            individual("0010", 2.0),
            individual("0011", 3.0),
        ];
        let ctx = test_context();
        let mut rng = StdRng::seed_from_u64(42);

        let pairs = Selector::Tournament
            .select_pairs(&generation, 2, &ctx, &Quadratic, &mut rng)
            .unwrap();

        // The phantom entrant is evaluated under the run context, so every
        // selected parent has a chromosome of the run length.
        assert_eq!(pairs.len(), 2);
        for (p1, p2) in &pairs {
            assert_eq!(p1.chromosome.len(), ctx.chromosome_length);
            assert_eq!(p2.chromosome.len(), ctx.chromosome_length);
        }
    }

    #[test]
    fn tournament_prefers_higher_fitness() {
        // Tournament of size 2 over two individuals picks the fitter one
        // whenever both are drawn.
        let generation = vec![individual("00", 1.0), individual("11", 10.0)];
        let mut rng = StdRng::seed_from_u64(42);

        let mut wins = 0;
        for _ in 0..200 {
            let best = run_tournament(&generation, None, 2, &mut rng);
            if best.chromosome == "11" {
                wins += 1;
            }
        }

        // P(select fitter) = 3/4 per tournament.
        assert!(wins > 100);
    }
}

//! Post-run quality measurements over a recorded generation history.

use crate::models::Individual;
use tracing::instrument;

/// Fraction of the theoretical optimum a generation's best must reach to
/// count for [`generation_at_90_percent`].
const NEAR_OPTIMAL_FRACTION: f64 = 0.9;

/// First generation (1-indexed) whose best fitness reached 90% of the
/// theoretical optimum, or `None` if no generation did.
#[instrument(level = "debug", skip(generations), fields(generations = generations.len()))]
pub fn generation_at_90_percent(generations: &[Vec<Individual>], optimal_value: f64) -> Option<usize> {
    let bar = NEAR_OPTIMAL_FRACTION * optimal_value;

    generations
        .iter()
        .position(|generation| {
            generation
                .iter()
                .any(|individual| individual.fitness >= bar)
        })
        .map(|index| index + 1)
}

/// Mean per-position bit diversity `2p(1-p)` of one generation, where `p` is
/// the fraction of ones at a position. 0 for generations of at most one
/// individual, and 1/2 at maximum (every position an even split).
pub fn generation_diversity(generation: &[Individual]) -> f64 {
    if generation.len() <= 1 {
        return 0.0;
    }

    let length = generation[0].chromosome.len();
    if length == 0 {
        return 0.0;
    }

    let population = generation.len() as f64;
    let mut total = 0.0;
    for position in 0..length {
        let ones = generation
            .iter()
            .filter(|individual| individual.chromosome.as_bytes().get(position) == Some(&b'1'))
            .count() as f64;
        let p = ones / population;
        total += 2.0 * p * (1.0 - p);
    }

    total / length as f64
}

/// Mean of [`generation_diversity`] over the whole run history.
#[instrument(level = "debug", skip(generations), fields(generations = generations.len()))]
pub fn average_diversity(generations: &[Vec<Individual>]) -> f64 {
    if generations.is_empty() {
        return 0.0;
    }

    let total: f64 = generations.iter().map(|g| generation_diversity(g)).sum();
    total / generations.len() as f64
}

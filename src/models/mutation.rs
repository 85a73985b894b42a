//! Mutation strategies.
//!
//! Bit flip gates every position independently; swap and inversion gate the
//! whole individual once and then rearrange existing bits without changing
//! the population's overall bit counts.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Mutation strategy applied to each child after recombination.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Mutation {
    /// Flips each bit independently with the mutation rate.
    BitFlip,
    /// With the mutation rate, exchanges two distinct random positions.
    Swap,
    /// With the mutation rate, reverses a random inclusive window.
    Inversion,
}

impl Mutation {
    /// Mutates one chromosome. The rate is expected to be in `[0, 1]`;
    /// chromosomes shorter than 2 bits cannot be rearranged and pass through
    /// swap and inversion unchanged.
    #[instrument(level = "debug", skip(self, rng, bits), fields(strategy = ?self, rate = rate))]
    pub(crate) fn apply<R: Rng>(&self, rng: &mut R, bits: &str, rate: f64) -> String {
        match self {
            Self::BitFlip => bits
                .chars()
                .map(|bit| {
                    if rng.random_bool(rate) {
                        if bit == '0' { '1' } else { '0' }
                    } else {
                        bit
                    }
                })
                .collect(),
            Self::Swap => {
                if bits.len() < 2 || !rng.random_bool(rate) {
                    return bits.to_string();
                }

                let first = rng.random_range(0..bits.len());
                let mut second = rng.random_range(0..bits.len());
                while second == first {
                    second = rng.random_range(0..bits.len());
                }

                let mut chromosome: Vec<char> = bits.chars().collect();
                chromosome.swap(first, second);
                chromosome.into_iter().collect()
            }
            Self::Inversion => {
                if bits.len() < 2 || !rng.random_bool(rate) {
                    return bits.to_string();
                }

                let mut start = rng.random_range(0..bits.len());
                let mut end = rng.random_range(0..bits.len());
                if start > end {
                    std::mem::swap(&mut start, &mut end);
                }
                if start == end {
                    // A one-bit window inverts to itself; widen it by one.
                    if end + 1 < bits.len() {
                        end += 1;
                    } else {
                        start = start.saturating_sub(1);
                    }
                }

                let mut chromosome: Vec<char> = bits.chars().collect();
                chromosome[start..=end].reverse();
                chromosome.into_iter().collect()
            }
        }
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[error("random population source requires a population size of at least 1")]
pub struct NotConfiguredError;

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[error("no initial chromosomes available")]
pub struct EmptyPopulationError;

/// Where the initial bit-string pool of a run comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum PopulationSource {
    /// Independently random chromosomes, one uniform coin flip per bit.
    Random { population_size: usize },
    /// Caller-supplied chromosomes, returned verbatim.
    Seeded { chromosomes: Vec<String> },
}

impl PopulationSource {
    /// Creates a random source for the given population size.
    pub fn random(population_size: usize) -> Result<Self, NotConfiguredError> {
        if population_size == 0 {
            return Err(NotConfiguredError);
        }

        Ok(Self::Random { population_size })
    }

    /// Creates a source that replays caller-supplied chromosomes.
    pub fn seeded(chromosomes: Vec<String>) -> Result<Self, EmptyPopulationError> {
        if chromosomes.is_empty() {
            return Err(EmptyPopulationError);
        }

        Ok(Self::Seeded { chromosomes })
    }

    /// Produces the initial pool of `length`-bit strings.
    #[instrument(level = "debug", skip(self, rng), fields(source = ?self))]
    pub(crate) fn generate<R: Rng>(
        &self,
        length: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, EmptyPopulationError> {
        match self {
            Self::Random { population_size } => Ok((0..*population_size)
                .map(|_| random_chromosome(length, rng))
                .collect()),
            Self::Seeded { chromosomes } => {
                if chromosomes.is_empty() {
                    return Err(EmptyPopulationError);
                }
                Ok(chromosomes.clone())
            }
        }
    }
}

/// One uniformly random `length`-bit string.
pub(crate) fn random_chromosome<R: Rng>(length: usize, rng: &mut R) -> String {
    (0..length)
        .map(|_| if rng.random_bool(0.5) { '1' } else { '0' })
        .collect()
}

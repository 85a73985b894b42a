mod context;
mod crossover;
mod function;
mod individual;
mod mutation;
mod population;
mod selector;

pub use context::RunContext;
pub use crossover::{Crossover, CutPoints, LengthMismatchError};
pub use function::{
    CREDIT_CHROMOSOME_LENGTH, CreditProfile, CreditScore, EvaluationMode, FitnessFunction,
    FunctionError, Quadratic, Quartic, RiskBand, UnsupportedModeError,
};
pub use individual::Individual;
pub use mutation::Mutation;
pub use population::{EmptyPopulationError, NotConfiguredError, PopulationSource};
pub use selector::Selector;

pub(crate) use individual::build_ranked_generation;

//! String-keyed lookup of fitness functions and operator strategies.
//!
//! Run requests carry strategy names rather than values, so a run can be
//! described entirely in serialized form. The registry resolves those names;
//! `standard()` preloads the built-in functions and operators, and callers
//! can register their own fitness functions on top.

use crate::models::{CreditScore, Crossover, FitnessFunction, Mutation, Quadratic, Quartic, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[error("unknown {kind} strategy: {key}")]
pub struct UnknownStrategyError {
    pub kind: &'static str,
    pub key: String,
}

impl UnknownStrategyError {
    fn new(kind: &'static str, key: &str) -> Self {
        Self {
            kind,
            key: key.to_string(),
        }
    }
}

/// Resolves strategy keys to fitness functions and operators.
pub struct Registry {
    functions: HashMap<String, Arc<dyn FitnessFunction>>,
    selectors: HashMap<String, Selector>,
    crossovers: HashMap<String, Crossover>,
    mutations: HashMap<String, Mutation>,
}

impl Registry {
    /// Empty registry with no functions or operators.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            selectors: HashMap::new(),
            crossovers: HashMap::new(),
            mutations: HashMap::new(),
        }
    }

    /// Registry preloaded with every built-in strategy.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register_function("quadratic", Arc::new(Quadratic));
        registry.register_function("quartic", Arc::new(Quartic));
        registry.register_function("credit", Arc::new(CreditScore));

        registry.register_selector("roulette", Selector::Roulette);
        registry.register_selector("tournament", Selector::Tournament);

        registry.register_crossover("single", Crossover::single_point());
        registry.register_crossover("double", Crossover::two_point());
        registry.register_crossover("uniform", Crossover::uniform());

        registry.register_mutation("simple", Mutation::BitFlip);
        registry.register_mutation("swap", Mutation::Swap);
        registry.register_mutation("inversive", Mutation::Inversion);

        registry
    }

    /// Registers a fitness function under `key`, replacing any previous entry.
    pub fn register_function(&mut self, key: &str, function: Arc<dyn FitnessFunction>) {
        self.functions.insert(key.to_string(), function);
    }

    pub fn register_selector(&mut self, key: &str, selector: Selector) {
        self.selectors.insert(key.to_string(), selector);
    }

    pub fn register_crossover(&mut self, key: &str, crossover: Crossover) {
        self.crossovers.insert(key.to_string(), crossover);
    }

    pub fn register_mutation(&mut self, key: &str, mutation: Mutation) {
        self.mutations.insert(key.to_string(), mutation);
    }

    pub fn function(&self, key: &str) -> Result<Arc<dyn FitnessFunction>, UnknownStrategyError> {
        self.functions
            .get(key)
            .cloned()
            .ok_or_else(|| UnknownStrategyError::new("fitness function", key))
    }

    pub fn selector(&self, key: &str) -> Result<Selector, UnknownStrategyError> {
        self.selectors
            .get(key)
            .copied()
            .ok_or_else(|| UnknownStrategyError::new("selection", key))
    }

    pub fn crossover(&self, key: &str) -> Result<Crossover, UnknownStrategyError> {
        self.crossovers
            .get(key)
            .copied()
            .ok_or_else(|| UnknownStrategyError::new("crossover", key))
    }

    pub fn mutation(&self, key: &str) -> Result<Mutation, UnknownStrategyError> {
        self.mutations
            .get(key)
            .copied()
            .ok_or_else(|| UnknownStrategyError::new("mutation", key))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EvaluationMode, FunctionError};

    #[test]
    fn it_resolves_every_builtin_key() {
        let registry = Registry::standard();

        for key in ["quadratic", "quartic", "credit"] {
            assert!(registry.function(key).is_ok(), "missing function {key}");
        }
        for key in ["roulette", "tournament"] {
            assert!(registry.selector(key).is_ok(), "missing selector {key}");
        }
        for key in ["single", "double", "uniform"] {
            assert!(registry.crossover(key).is_ok(), "missing crossover {key}");
        }
        for key in ["simple", "swap", "inversive"] {
            assert!(registry.mutation(key).is_ok(), "missing mutation {key}");
        }
    }

    #[test]
    fn it_rejects_unknown_keys() {
        let registry = Registry::standard();

        let error = registry.function("rosenbrock").unwrap_err();
        assert_eq!(error.kind, "fitness function");
        assert_eq!(error.key, "rosenbrock");

        assert!(registry.selector("rank").is_err());
        assert!(registry.crossover("triple").is_err());
        assert!(registry.mutation("scramble").is_err());
    }

    #[test]
    fn it_accepts_custom_functions() {
        #[derive(Debug)]
        struct Linear;

        impl FitnessFunction for Linear {
            fn name(&self) -> &'static str {
                "linear"
            }

            fn mode(&self) -> EvaluationMode {
                EvaluationMode::RealValued
            }

            fn evaluate(&self, x: f64) -> Result<f64, FunctionError> {
                Ok(x)
            }

            fn optimal_value(&self) -> f64 {
                10.0
            }

            fn target_input(&self) -> f64 {
                10.0
            }
        }

        let mut registry = Registry::standard();
        registry.register_function("linear", Arc::new(Linear));

        let function = registry.function("linear").unwrap();
        assert_eq!(function.evaluate(3.0).unwrap(), 3.0);
    }
}

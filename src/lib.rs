pub mod codec;
pub mod engine;
pub mod metrics;
pub mod models;
pub mod registry;

pub use engine::{Engine, Error, Outcome, Progress, Run, RunConfig};
pub use registry::{Registry, UnknownStrategyError};

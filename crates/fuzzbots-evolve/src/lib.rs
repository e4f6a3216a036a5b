//! Genetic search over controller genomes: fitness, breeding, the generation loop and
//! head-to-head comparison.

use fuzzbots_core::ConfigError;
use thiserror::Error;

pub mod compare;
pub mod fitness;
pub mod optimizer;
pub mod population;

pub use compare::{
    ComparisonConfig, ComparisonSummary, RoundRecord, RoundWinner, compare, judge,
};
pub use fitness::FitnessWeights;
pub use optimizer::{EvolutionConfig, GenerationReport, Optimizer};
pub use population::{Breeding, Population, Scored, evolve};

/// Errors raised while configuring or running the optimizer.
#[derive(Debug, Error)]
pub enum EvolveError {
    /// Indicates an invalid hyperparameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("expected a population of {expected} genomes but got {actual}")]
    PopulationSize { expected: usize, actual: usize },
    #[error("population is empty")]
    EmptyPopulation,
    /// Raised by generation observers, e.g. when a history sink fails.
    #[error("observer failed: {0}")]
    Observer(String),
}

use super::traits::{invalid, ConfigSection};
use crate::engines::generation::{Creator, EngineConfig, Mutator};
use crate::error::AcmeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Stop once a model reaches this fitness
    pub optimal_fitness: f64,
    pub max_age: Option<usize>,
    pub pool_size: usize,
    pub use_crossover: bool,
    /// Probability of every optional decision taken while creating a genotype
    pub create_threshold: f64,
    pub max_connection_attempts: usize,
    pub max_mutation_changes: usize,
    pub seed: Option<u64>,
    pub max_iterations: Option<usize>,
    pub max_seconds: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            optimal_fitness: 0.9,
            max_age: Some(50),
            pool_size: 10,
            use_crossover: true,
            create_threshold: Creator::DEFAULT_THRESHOLD,
            max_connection_attempts: Creator::DEFAULT_CONNECTION_ATTEMPTS,
            max_mutation_changes: Mutator::DEFAULT_MAX_CHANGES,
            seed: None,
            max_iterations: None,
            max_seconds: None,
        }
    }
}

impl SearchConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            optimal_fitness: self.optimal_fitness,
            max_age: self.max_age,
            pool_size: self.pool_size,
            use_crossover: self.use_crossover,
            max_iterations: self.max_iterations,
            max_duration: self.max_seconds.map(Duration::from_secs),
            seed: self.seed,
        }
    }

    pub fn creator(&self) -> Creator {
        Creator::new(self.create_threshold, self.max_connection_attempts)
    }

    pub fn mutator(&self) -> Mutator {
        Mutator::new(self.max_mutation_changes)
    }
}

impl ConfigSection for SearchConfig {
    fn section_name() -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<(), AcmeError> {
        let section = Self::section_name();
        if self.pool_size == 0 {
            return Err(invalid(section, "Pool size must be at least 1"));
        }
        if self.max_age == Some(0) {
            return Err(invalid(section, "Max age must be positive, omit it to disable aging"));
        }
        if !(0.0..=1.0).contains(&self.create_threshold) {
            return Err(invalid(section, "Create threshold must be between 0 and 1"));
        }
        if self.max_connection_attempts == 0 {
            return Err(invalid(section, "Max connection attempts must be at least 1"));
        }
        if self.max_mutation_changes == 0 {
            return Err(invalid(section, "Max mutation changes must be at least 1"));
        }
        if self.optimal_fitness.is_nan() {
            return Err(invalid(section, "Optimal fitness must be a number"));
        }
        Ok(())
    }
}

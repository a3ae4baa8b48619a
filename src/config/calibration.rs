use super::traits::{invalid, ConfigSection};
use crate::error::AcmeError;
use crate::functions::Techniques;
use serde::{Deserialize, Serialize};

/// Environment variable set by Open MPI launchers
pub const MPI_WORLD_SIZE_VAR: &str = "OMPI_COMM_WORLD_SIZE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub objective_function: String,
    pub distribution: String,
    pub algorithm: String,
    pub evapotranspiration: String,
    pub repetitions: usize,
    pub convergence_limit: f64,
    pub execution_mode: ExecutionMode,
    pub persistence: Persistence,
    /// Fitness assigned to models whose evaluation failed
    pub failure_fitness: f64,
}

/// Whether the calibrator runs its simulations in-process or across workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    Distributed,
}

/// How much of each calibration run the sampler keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    #[serde(alias = "none")]
    NoData,
    Ram,
    Csv,
}

impl ExecutionMode {
    /// Distributed when the process was started by an MPI launcher.
    ///
    /// Only called by code that opts in; the search itself reads the
    /// configured mode.
    pub fn from_process_env() -> Self {
        if std::env::var_os(MPI_WORLD_SIZE_VAR).is_some() {
            Self::Distributed
        } else {
            Self::Sequential
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "seq",
            Self::Distributed => "mpi",
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            objective_function: "nashsutcliffe".to_string(),
            distribution: "uniform".to_string(),
            algorithm: "dream".to_string(),
            evapotranspiration: "penman_monteith".to_string(),
            repetitions: 500,
            convergence_limit: 1.6,
            execution_mode: ExecutionMode::Sequential,
            persistence: Persistence::NoData,
            failure_fitness: -1e9,
        }
    }
}

impl ConfigSection for CalibrationConfig {
    fn section_name() -> &'static str {
        "calibration"
    }

    fn validate(&self) -> Result<(), AcmeError> {
        let section = Self::section_name();
        if self.repetitions == 0 {
            return Err(invalid(section, "Repetitions must be at least 1"));
        }
        if !(self.convergence_limit > 0.0) {
            return Err(invalid(section, "Convergence limit must be positive"));
        }
        if !self.failure_fitness.is_finite() {
            return Err(invalid(section, "Failure fitness must be finite"));
        }
        // Unknown names are fatal before any search starts
        Techniques::resolve(self)?;
        Ok(())
    }
}

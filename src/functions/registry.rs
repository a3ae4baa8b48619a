use super::{Algorithm, EtMethod, ObjectiveFunction, ParameterDistribution};
use crate::config::CalibrationConfig;
use crate::error::Result;

/// The concrete techniques behind the names in a calibration config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Techniques {
    pub objective: ObjectiveFunction,
    pub distribution: ParameterDistribution,
    pub algorithm: Algorithm,
    pub evapotranspiration: EtMethod,
}

impl Techniques {
    /// Look up every name, failing on the first one that is not recognised
    pub fn resolve(config: &CalibrationConfig) -> Result<Self> {
        Ok(Self {
            objective: config.objective_function.parse()?,
            distribution: config.distribution.parse()?,
            algorithm: config.algorithm.parse()?,
            evapotranspiration: config.evapotranspiration.parse()?,
        })
    }
}

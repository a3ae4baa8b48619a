pub mod cache;
pub mod calibration;
pub mod evaluator;

pub use cache::{CacheStats, FitnessCache};
pub use calibration::{
    Calibrator, CatchmentModel, ModelFactory, ModelSettings, MonteCarloCalibrator, MonteCarloSampler,
    ParameterSpec, Sampler,
};
pub use evaluator::FitnessEvaluator;

//! Seams to the hydrological model builder and the calibration engine.
//!
//! Building a model from a genotype and calibrating it are external concerns:
//! the search only needs a best likelihood per structure. Implementations
//! return `anyhow::Result` so any engine error can surface unchanged.

use crate::config::{ExecutionMode, PeriodConfig, Persistence};
use crate::data::{ForcingData, ForcingWindow};
use crate::engines::generation::Genotype;
use crate::functions::{Algorithm, EtMethod, ObjectiveFunction, ParameterDistribution, Techniques};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A calibratable parameter and the range it is drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub low: f64,
    pub high: f64,
    pub distribution: ParameterDistribution,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, low: f64, high: f64, distribution: ParameterDistribution) -> Self {
        Self {
            name: name.into(),
            low,
            high,
            distribution,
        }
    }

    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> crate::Result<f64> {
        self.distribution.sample(self.low, self.high, rng)
    }
}

/// Everything a factory needs besides the genotype and the forcing
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub objective: ObjectiveFunction,
    pub distribution: ParameterDistribution,
    pub evapotranspiration: EtMethod,
    pub algorithm: Algorithm,
    pub period: PeriodConfig,
    pub window: ForcingWindow,
}

impl ModelSettings {
    pub fn new(techniques: Techniques, period: PeriodConfig, window: ForcingWindow) -> Self {
        Self {
            objective: techniques.objective,
            distribution: techniques.distribution,
            evapotranspiration: techniques.evapotranspiration,
            algorithm: techniques.algorithm,
            period,
            window,
        }
    }
}

pub trait CatchmentModel: Send {
    fn parameters(&self) -> Vec<ParameterSpec>;

    /// Simulated discharge for one parameter set
    fn simulate(&mut self, parameters: &[f64]) -> anyhow::Result<Vec<f64>>;

    fn observed(&self) -> &[f64];

    fn objective(&self) -> ObjectiveFunction;

    /// Objective of a simulation against the observations, higher is better
    fn likelihood(&mut self, parameters: &[f64]) -> anyhow::Result<f64> {
        let simulated = self.simulate(parameters)?;
        Ok(self.objective().evaluate(self.observed(), &simulated)?)
    }
}

pub trait ModelFactory: Send + Sync {
    fn build(
        &self,
        genotype: &Genotype,
        forcing: &ForcingData,
        settings: &ModelSettings,
    ) -> anyhow::Result<Box<dyn CatchmentModel>>;
}

pub trait Sampler {
    fn sample(&mut self, repetitions: usize, convergence_limit: f64) -> anyhow::Result<()>;

    fn best_likelihood(&self) -> Option<f64>;
}

pub trait Calibrator: Send + Sync {
    fn sampler(
        &self,
        model: Box<dyn CatchmentModel>,
        mode: ExecutionMode,
        persistence: Persistence,
    ) -> anyhow::Result<Box<dyn Sampler>>;
}

/// Plain Monte Carlo: independent draws from every parameter's distribution
#[derive(Debug, Clone, Default)]
pub struct MonteCarloCalibrator {
    seed: Option<u64>,
}

impl MonteCarloCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// The concrete sampler, for callers that want the kept runs
    pub fn monte_carlo_sampler(
        &self,
        model: Box<dyn CatchmentModel>,
        mode: ExecutionMode,
        persistence: Persistence,
    ) -> anyhow::Result<MonteCarloSampler> {
        if persistence == Persistence::Csv {
            anyhow::bail!("Monte Carlo sampler cannot persist runs to CSV");
        }
        if mode == ExecutionMode::Distributed {
            log::debug!("Monte Carlo sampler runs in-process, ignoring {} mode", mode.as_str());
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(MonteCarloSampler {
            model,
            rng,
            keep_runs: persistence == Persistence::Ram,
            runs: Vec::new(),
            best: None,
        })
    }
}

impl Calibrator for MonteCarloCalibrator {
    fn sampler(
        &self,
        model: Box<dyn CatchmentModel>,
        mode: ExecutionMode,
        persistence: Persistence,
    ) -> anyhow::Result<Box<dyn Sampler>> {
        Ok(Box::new(self.monte_carlo_sampler(model, mode, persistence)?))
    }
}

pub struct MonteCarloSampler {
    model: Box<dyn CatchmentModel>,
    rng: StdRng,
    keep_runs: bool,
    runs: Vec<(Vec<f64>, f64)>,
    best: Option<f64>,
}

impl MonteCarloSampler {
    /// Parameter sets and likelihoods, kept only with RAM persistence
    pub fn runs(&self) -> &[(Vec<f64>, f64)] {
        &self.runs
    }
}

impl Sampler for MonteCarloSampler {
    fn sample(&mut self, repetitions: usize, _convergence_limit: f64) -> anyhow::Result<()> {
        let specs = self.model.parameters();
        for _ in 0..repetitions {
            let mut parameters = Vec::with_capacity(specs.len());
            for spec in &specs {
                parameters.push(spec.sample(&mut self.rng)?);
            }

            let likelihood = self.model.likelihood(&parameters)?;
            if likelihood.is_nan() {
                continue;
            }
            if self.best.map_or(true, |best| likelihood > best) {
                self.best = Some(likelihood);
            }
            if self.keep_runs {
                self.runs.push((parameters, likelihood));
            }
        }
        Ok(())
    }

    fn best_likelihood(&self) -> Option<f64> {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Simulates `a * prec` against observations of `2 * prec`
    struct Linear {
        prec: Vec<f64>,
        observed: Vec<f64>,
    }

    impl CatchmentModel for Linear {
        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![ParameterSpec::new("a", 0.0, 4.0, ParameterDistribution::Uniform)]
        }

        fn simulate(&mut self, parameters: &[f64]) -> anyhow::Result<Vec<f64>> {
            Ok(self.prec.iter().map(|p| p * parameters[0]).collect())
        }

        fn observed(&self) -> &[f64] {
            &self.observed
        }

        fn objective(&self) -> ObjectiveFunction {
            ObjectiveFunction::NashSutcliffe
        }
    }

    fn model() -> Box<dyn CatchmentModel> {
        let prec = vec![1.0, 3.0, 0.0, 2.0, 5.0];
        let observed = prec.iter().map(|p| p * 2.0).collect();
        Box::new(Linear { prec, observed })
    }

    #[test]
    fn test_monte_carlo_finds_good_parameters() {
        let calibrator = MonteCarloCalibrator::with_seed(7);
        let mut sampler = calibrator
            .sampler(model(), ExecutionMode::Sequential, Persistence::NoData)
            .unwrap();
        assert!(sampler.best_likelihood().is_none());

        sampler.sample(500, 1.6).unwrap();
        let best = sampler.best_likelihood().unwrap();
        assert!(best > 0.99 && best <= 1.0, "best = {}", best);
    }

    #[test]
    fn test_same_seed_same_result() {
        let calibrator = MonteCarloCalibrator::with_seed(11);
        let mut first = calibrator
            .sampler(model(), ExecutionMode::Distributed, Persistence::Ram)
            .unwrap();
        let mut second = calibrator
            .sampler(model(), ExecutionMode::Sequential, Persistence::NoData)
            .unwrap();
        first.sample(20, 1.6).unwrap();
        second.sample(20, 1.6).unwrap();
        assert_eq!(first.best_likelihood(), second.best_likelihood());
    }

    #[test]
    fn test_ram_persistence_keeps_runs() {
        let calibrator = MonteCarloCalibrator::with_seed(3);
        let mut kept = calibrator
            .monte_carlo_sampler(model(), ExecutionMode::Sequential, Persistence::Ram)
            .unwrap();
        kept.sample(15, 1.6).unwrap();
        assert_eq!(kept.runs().len(), 15);
        let best = kept.runs().iter().map(|(_, l)| *l).fold(f64::MIN, f64::max);
        assert_eq!(kept.best_likelihood(), Some(best));

        let mut dropped = calibrator
            .monte_carlo_sampler(model(), ExecutionMode::Sequential, Persistence::NoData)
            .unwrap();
        dropped.sample(15, 1.6).unwrap();
        assert!(dropped.runs().is_empty());
    }

    #[test]
    fn test_csv_persistence_unsupported() {
        let calibrator = MonteCarloCalibrator::new();
        assert!(calibrator
            .sampler(model(), ExecutionMode::Sequential, Persistence::Csv)
            .is_err());
    }
}

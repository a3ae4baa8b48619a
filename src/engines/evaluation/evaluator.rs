use super::cache::{CacheStats, FitnessCache};
use super::calibration::{Calibrator, ModelFactory, ModelSettings};
use crate::config::CalibrationConfig;
use crate::data::ForcingData;
use crate::engines::generation::Genotype;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Calibrates each distinct model structure once and remembers its fitness.
///
/// A failed build or calibration is not fatal: the structure gets the
/// configured failure fitness, which is cached like any other result so the
/// search never retries it.
pub struct FitnessEvaluator {
    factory: Arc<dyn ModelFactory>,
    calibrator: Arc<dyn Calibrator>,
    forcing: Arc<ForcingData>,
    settings: ModelSettings,
    calibration: CalibrationConfig,
    cache: FitnessCache,
    evaluations: AtomicUsize,
}

impl FitnessEvaluator {
    pub fn new(
        factory: Arc<dyn ModelFactory>,
        calibrator: Arc<dyn Calibrator>,
        forcing: Arc<ForcingData>,
        settings: ModelSettings,
        calibration: CalibrationConfig,
        cache: FitnessCache,
    ) -> Self {
        Self {
            factory,
            calibrator,
            forcing,
            settings,
            calibration,
            cache,
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn fitness(&self, genotype: &Genotype) -> f64 {
        let key = genotype.key();
        if let Some(fitness) = self.cache.get(&key) {
            log::debug!("Cache hit for {}: {:.4}", key, fitness);
            return fitness;
        }
        log::debug!("Cache miss for {}", key);

        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let fitness = match self.calibrate(genotype) {
            Ok(fitness) => fitness,
            Err(e) => {
                log::warn!(
                    "Evaluation of [{}] failed, using fitness {}: {:#}",
                    genotype,
                    self.calibration.failure_fitness,
                    e
                );
                self.calibration.failure_fitness
            }
        };

        self.cache.insert(key, fitness);
        fitness
    }

    fn calibrate(&self, genotype: &Genotype) -> anyhow::Result<f64> {
        let model = self.factory.build(genotype, &self.forcing, &self.settings)?;
        let mut sampler = self.calibrator.sampler(
            model,
            self.calibration.execution_mode,
            self.calibration.persistence,
        )?;
        sampler.sample(self.calibration.repetitions, self.calibration.convergence_limit)?;

        match sampler.best_likelihood() {
            Some(best) if best.is_nan() => anyhow::bail!("best likelihood is NaN"),
            Some(best) => Ok(best),
            None => anyhow::bail!("sampler reported no likelihood"),
        }
    }

    /// Number of structures actually calibrated
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &FitnessCache {
        &self.cache
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

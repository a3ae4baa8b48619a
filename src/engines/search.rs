use crate::config::AppConfig;
use crate::data::{BestModel, BestModelWriter, ForcingData, ForcingSeries};
use crate::engines::evaluation::{Calibrator, FitnessCache, FitnessEvaluator, ModelFactory, ModelSettings};
use crate::engines::generation::{
    crossover, Creator, EvolutionEngine, GeneUniverse, GeneticProblem, Genotype, LogProgressCallback,
    Mutator, ProgressCallback, StructuralValidator,
};
use crate::error::{AcmeError, Result};
use crate::functions::Techniques;
use rand::rngs::StdRng;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Lumped model structures as a genetic problem. Every candidate leaving
/// create, mutate or crossover has been through the structural validator.
pub struct LumpedModelProblem<'a> {
    universe: &'a GeneUniverse,
    creator: &'a Creator,
    mutator: &'a Mutator,
    validator: StructuralValidator,
    evaluator: &'a FitnessEvaluator,
}

impl<'a> LumpedModelProblem<'a> {
    pub fn new(
        universe: &'a GeneUniverse,
        creator: &'a Creator,
        mutator: &'a Mutator,
        evaluator: &'a FitnessEvaluator,
    ) -> Self {
        Self {
            universe,
            creator,
            mutator,
            validator: StructuralValidator::new(),
            evaluator,
        }
    }
}

impl GeneticProblem for LumpedModelProblem<'_> {
    type Genes = Genotype;

    fn create(&mut self, rng: &mut StdRng) -> Genotype {
        self.validator.repair(&self.creator.create(rng))
    }

    fn mutate(&mut self, parent: &Genotype, rng: &mut StdRng) -> Genotype {
        self.validator.repair(&self.mutator.mutate(parent, self.universe, rng))
    }

    fn crossover(&mut self, parent: &Genotype, donor: &Genotype, rng: &mut StdRng) -> Option<Genotype> {
        if parent == donor {
            return None;
        }
        Some(self.validator.repair(&crossover(parent, donor, rng)))
    }

    fn fitness(&mut self, genes: &Genotype) -> f64 {
        self.evaluator.fitness(genes)
    }
}

/// Searches for the best lumped model structure for one catchment
pub struct ModelSearch {
    config: AppConfig,
    techniques: Techniques,
    universe: GeneUniverse,
    creator: Creator,
    mutator: Mutator,
    evaluator: FitnessEvaluator,
}

impl ModelSearch {
    /// Fails before any model is built when a name in the config is not
    /// recognised or the forcing lacks a series the setup needs.
    pub fn new(
        config: AppConfig,
        forcing: ForcingData,
        factory: Arc<dyn ModelFactory>,
        calibrator: Arc<dyn Calibrator>,
    ) -> Result<Self> {
        let techniques = Techniques::resolve(&config.calibration)?;
        config.validate()?;

        if forcing.is_empty() {
            return Err(AcmeError::DataLoading("Forcing data is empty".to_string()));
        }
        let required: Vec<&str> = ForcingSeries::required().iter().map(|s| s.as_str()).collect();
        forcing.require(&required)?;
        forcing.require(techniques.evapotranspiration.required_series())?;

        let window = forcing.window(&config.period)?;
        let settings = ModelSettings::new(techniques, config.period.clone(), window);
        let evaluator = FitnessEvaluator::new(
            factory,
            calibrator,
            Arc::new(forcing),
            settings,
            config.calibration.clone(),
            FitnessCache::with_capacity(config.cache.capacity),
        );

        log::info!(
            "Model search: objective {}, algorithm {}, distribution {}, ET {}, execution {}",
            techniques.objective,
            techniques.algorithm,
            techniques.distribution,
            techniques.evapotranspiration,
            config.calibration.execution_mode.as_str()
        );
        if !techniques.algorithm.uses_convergence_limit() {
            log::debug!("{} ignores the convergence limit", techniques.algorithm);
        }

        Ok(Self {
            creator: config.search.creator(),
            mutator: config.search.mutator(),
            universe: GeneUniverse::lumped(),
            techniques,
            evaluator,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn techniques(&self) -> &Techniques {
        &self.techniques
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Run to completion, logging every improvement
    pub fn solve(&self) -> Result<BestModel> {
        self.solve_with(&mut LogProgressCallback, None)
    }

    pub fn solve_with<C: ProgressCallback<Genotype>>(
        &self,
        callback: &mut C,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<BestModel> {
        let mut engine = EvolutionEngine::new(self.config.search.engine_config());
        if let Some(flag) = cancel {
            engine = engine.with_cancel_flag(flag);
        }

        let mut problem = LumpedModelProblem::new(&self.universe, &self.creator, &self.mutator, &self.evaluator);
        let outcome = engine.run(&mut problem, callback)?;

        let stats = self.evaluator.stats();
        log::info!(
            "Calibrated {} structures ({} cache hits)",
            self.evaluator.evaluations(),
            stats.hits
        );

        let best = BestModel::from_outcome(&outcome, self.evaluator.evaluations(), stats);
        if let Some(path) = &self.config.output.path {
            BestModelWriter::write(path, &best)?;
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExecutionMode, Persistence};
    use crate::engines::evaluation::{CatchmentModel, Sampler};
    use crate::engines::generation::Gene;

    struct Unused;

    impl ModelFactory for Unused {
        fn build(
            &self,
            _genotype: &Genotype,
            _forcing: &ForcingData,
            _settings: &ModelSettings,
        ) -> anyhow::Result<Box<dyn CatchmentModel>> {
            anyhow::bail!("not used")
        }
    }

    impl Calibrator for Unused {
        fn sampler(
            &self,
            _model: Box<dyn CatchmentModel>,
            _mode: ExecutionMode,
            _persistence: Persistence,
        ) -> anyhow::Result<Box<dyn Sampler>> {
            anyhow::bail!("not used")
        }
    }

    fn forcing() -> ForcingData {
        ForcingData::new(vec![1.0; 3], vec![0.5; 3])
            .unwrap()
            .with_series(ForcingSeries::TMean, vec![5.0; 3])
            .unwrap()
    }

    #[test]
    fn test_unknown_identifier_fails_before_search() {
        let mut config = AppConfig::default();
        config.calibration.distribution = "cauchy".to_string();
        let result = ModelSearch::new(config, forcing(), Arc::new(Unused), Arc::new(Unused));
        assert!(matches!(
            result,
            Err(AcmeError::UnknownIdentifier { kind: "distribution", .. })
        ));
    }

    #[test]
    fn test_missing_et_series_rejected() {
        // Penman-Monteith needs t_min and t_max as well
        let result = ModelSearch::new(AppConfig::default(), forcing(), Arc::new(Unused), Arc::new(Unused));
        assert!(matches!(result, Err(AcmeError::DataLoading(_))));
    }

    #[test]
    fn test_crossover_of_equal_parents_is_declined() {
        let mut config = AppConfig::default();
        config.calibration.evapotranspiration = "turc".to_string();
        config.cache.capacity = Some(64);
        let search = ModelSearch::new(config, forcing(), Arc::new(Unused), Arc::new(Unused)).unwrap();
        assert_eq!(search.techniques().evapotranspiration, crate::functions::EtMethod::Turc);
        assert_eq!(search.evaluator().cache().capacity(), Some(64));
        assert_eq!(search.evaluator().settings().window.calibration, 0..3);
        let mut problem = LumpedModelProblem::new(
            &search.universe,
            &search.creator,
            &search.mutator,
            &search.evaluator,
        );

        let mut rng = <StdRng as rand::SeedableRng>::seed_from_u64(3);
        let a = Genotype::from_genes([Gene::Snow, Gene::TrFirstOut]);
        let b = Genotype::from_genes([Gene::TrFirstOut, Gene::Snow]);
        assert!(problem.crossover(&a, &b, &mut rng).is_none());

        let c = Genotype::from_genes([Gene::River]);
        let child = problem.crossover(&a, &c, &mut rng).unwrap();
        assert!(StructuralValidator::new().is_connected(&child));
    }
}

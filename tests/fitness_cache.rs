use acme::config::{CalibrationConfig, ExecutionMode, PeriodConfig, Persistence};
use acme::data::{ForcingData, ForcingWindow};
use acme::engines::evaluation::{
    Calibrator, CatchmentModel, FitnessCache, FitnessEvaluator, ModelFactory, ModelSettings, ParameterSpec,
    Sampler,
};
use acme::engines::generation::{Gene, Genotype};
use acme::functions::{ObjectiveFunction, Techniques};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scores a structure by its size and counts every build
struct CountingFactory {
    builds: Arc<AtomicUsize>,
}

struct SizedModel {
    size: usize,
}

impl CatchmentModel for SizedModel {
    fn parameters(&self) -> Vec<ParameterSpec> {
        Vec::new()
    }

    fn simulate(&mut self, _parameters: &[f64]) -> anyhow::Result<Vec<f64>> {
        Ok(vec![self.size as f64])
    }

    fn observed(&self) -> &[f64] {
        &[]
    }

    fn objective(&self) -> ObjectiveFunction {
        ObjectiveFunction::NashSutcliffe
    }
}

impl ModelFactory for CountingFactory {
    fn build(
        &self,
        genotype: &Genotype,
        _forcing: &ForcingData,
        _settings: &ModelSettings,
    ) -> anyhow::Result<Box<dyn CatchmentModel>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if genotype.contains(Gene::Canopy) {
            anyhow::bail!("canopy storage not available in this engine");
        }
        Ok(Box::new(SizedModel { size: genotype.len() }))
    }
}

struct SizeSampler {
    model: Box<dyn CatchmentModel>,
    best: Option<f64>,
}

impl Sampler for SizeSampler {
    fn sample(&mut self, _repetitions: usize, _convergence_limit: f64) -> anyhow::Result<()> {
        let simulated = self.model.simulate(&[])?;
        self.best = simulated.first().map(|size| size / 10.0);
        Ok(())
    }

    fn best_likelihood(&self) -> Option<f64> {
        self.best
    }
}

struct SizeCalibrator;

impl Calibrator for SizeCalibrator {
    fn sampler(
        &self,
        model: Box<dyn CatchmentModel>,
        _mode: ExecutionMode,
        _persistence: Persistence,
    ) -> anyhow::Result<Box<dyn Sampler>> {
        Ok(Box::new(SizeSampler { model, best: None }))
    }
}

fn evaluator(capacity: Option<usize>) -> (FitnessEvaluator, Arc<AtomicUsize>) {
    let builds = Arc::new(AtomicUsize::new(0));
    let forcing = ForcingData::new(vec![1.0, 2.0], vec![0.5, 0.7]).unwrap();
    let settings = ModelSettings::new(
        Techniques::resolve(&CalibrationConfig::default()).unwrap(),
        PeriodConfig::default(),
        ForcingWindow {
            calibration: 0..2,
            validation: 2..2,
        },
    );
    let evaluator = FitnessEvaluator::new(
        Arc::new(CountingFactory {
            builds: Arc::clone(&builds),
        }),
        Arc::new(SizeCalibrator),
        Arc::new(forcing),
        settings,
        CalibrationConfig::default(),
        FitnessCache::with_capacity(capacity),
    );
    (evaluator, builds)
}

fn genotype(names: &[&str]) -> Genotype {
    names.iter().map(|n| n.parse::<Gene>().unwrap()).collect()
}

#[test]
fn test_gene_order_does_not_matter() {
    let (evaluator, builds) = evaluator(None);

    let first = evaluator.fitness(&genotype(&["snow", "river"]));
    let second = evaluator.fitness(&genotype(&["river", "snow"]));

    assert_eq!(first, 0.2);
    assert_eq!(second, first);
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    let stats = evaluator.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn test_distinct_structures_are_each_calibrated_once() {
    let (evaluator, builds) = evaluator(None);
    let structures = [
        genotype(&["tr_first_out"]),
        genotype(&["snow", "tr_first_out"]),
        genotype(&["river", "river_out", "tr_first_river"]),
    ];

    for _ in 0..3 {
        for structure in &structures {
            evaluator.fitness(structure);
        }
    }

    assert_eq!(builds.load(Ordering::SeqCst), 3);
    assert_eq!(evaluator.evaluations(), 3);
    assert_eq!(evaluator.stats().hits, 6);
}

#[test]
fn test_failed_evaluation_is_cached_as_sentinel() {
    let (evaluator, builds) = evaluator(None);
    let broken = genotype(&["canopy", "lai", "tr_first_out"]);

    assert_eq!(evaluator.fitness(&broken), -1e9);
    assert_eq!(evaluator.fitness(&broken), -1e9);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn test_bounded_cache_recalibrates_evicted_structures() {
    let (evaluator, builds) = evaluator(Some(2));
    let a = genotype(&["tr_first_out"]);
    let b = genotype(&["snow", "tr_first_out"]);
    let c = genotype(&["snow", "meltrate", "tr_first_out"]);

    evaluator.fitness(&a);
    evaluator.fitness(&b);
    evaluator.fitness(&a);
    evaluator.fitness(&c);
    assert_eq!(builds.load(Ordering::SeqCst), 3);
    assert_eq!(evaluator.stats().evictions, 1);

    // b was least recently used
    evaluator.fitness(&a);
    assert_eq!(builds.load(Ordering::SeqCst), 3);
    evaluator.fitness(&b);
    assert_eq!(builds.load(Ordering::SeqCst), 4);
}

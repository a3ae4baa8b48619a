use crate::error::{AcmeError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The callables the engine needs from a concrete search problem
pub trait GeneticProblem {
    type Genes: Clone;

    fn create(&mut self, rng: &mut StdRng) -> Self::Genes;

    fn mutate(&mut self, parent: &Self::Genes, rng: &mut StdRng) -> Self::Genes;

    /// Combine two parents. `None` means the parents are indistinguishable.
    fn crossover(
        &mut self,
        parent: &Self::Genes,
        donor: &Self::Genes,
        rng: &mut StdRng,
    ) -> Option<Self::Genes>;

    /// Higher is better
    fn fitness(&mut self, genes: &Self::Genes) -> f64;
}

/// How a candidate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Create,
    Mutate,
    Crossover,
}

#[derive(Debug, Clone)]
pub struct Candidate<G> {
    pub genes: G,
    pub fitness: f64,
    pub strategy: Strategy,
    pub age: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    OptimalFitness,
    IterationLimit,
    TimeLimit,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome<G> {
    pub best: Candidate<G>,
    pub stop_reason: StopReason,
    pub iterations: usize,
    pub elapsed: Duration,
}

pub trait ProgressCallback<G> {
    fn on_improvement(&mut self, candidate: &Candidate<G>, elapsed: Duration);

    fn on_finished(&mut self, _outcome: &SearchOutcome<G>) {}
}

impl<G> ProgressCallback<G> for () {
    fn on_improvement(&mut self, _candidate: &Candidate<G>, _elapsed: Duration) {}
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub optimal_fitness: f64,
    /// `None` disables age based replacement
    pub max_age: Option<usize>,
    pub pool_size: usize,
    pub use_crossover: bool,
    pub max_iterations: Option<usize>,
    pub max_duration: Option<Duration>,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            optimal_fitness: 1.0,
            max_age: Some(50),
            pool_size: 10,
            use_crossover: true,
            max_iterations: None,
            max_duration: None,
            seed: None,
        }
    }
}

/// Age based pool search.
///
/// Pool slots are revisited in turn and each gets a child from a randomly
/// picked strategy. Strategies that produced an improvement are appended to
/// the pick list again, so successful ones are chosen more often. A parent
/// that keeps losing ages; once it reaches `max_age` it is replaced either by
/// its child (more likely the less the child resembles past bests) or by the
/// best candidate found so far.
pub struct EvolutionEngine {
    config: EngineConfig,
    rng: StdRng,
    cancelled: Option<Arc<AtomicBool>>,
}

impl EvolutionEngine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            rng,
            cancelled: None,
        }
    }

    /// Stop the run at the next iteration once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run<P, C>(
        &mut self,
        problem: &mut P,
        callback: &mut C,
    ) -> Result<SearchOutcome<P::Genes>>
    where
        P: GeneticProblem,
        C: ProgressCallback<P::Genes>,
    {
        if self.config.pool_size == 0 {
            return Err(AcmeError::Search("Pool size must be at least 1".to_string()));
        }

        let start = Instant::now();
        let mut iterations = 0;
        let mut strategies = vec![Strategy::Mutate];
        if self.config.use_crossover {
            strategies.push(Strategy::Crossover);
        }

        let mut best = self.generate(problem);
        callback.on_improvement(&best, start.elapsed());
        // The first best counts as an improvement, which puts Create in the pick list
        strategies.push(best.strategy);
        if self.is_optimal(&best) {
            return Ok(self.finish(best, StopReason::OptimalFitness, iterations, start, callback));
        }

        let mut historical_fitnesses = vec![best.fitness];
        let mut parents = vec![best.clone()];

        for _ in 1..self.config.pool_size {
            let parent = self.generate(problem);
            if parent.fitness > best.fitness {
                best = parent.clone();
                callback.on_improvement(&best, start.elapsed());
                strategies.push(best.strategy);
                historical_fitnesses.push(best.fitness);
                if self.is_optimal(&best) {
                    return Ok(self.finish(best, StopReason::OptimalFitness, iterations, start, callback));
                }
            }
            parents.push(parent);
        }

        let last_index = parents.len() - 1;
        let mut index = 1;

        loop {
            if let Some(reason) = self.should_stop(iterations, start) {
                return Ok(self.finish(best, reason, iterations, start, callback));
            }
            iterations += 1;

            index = if index > 0 { index - 1 } else { last_index };
            let strategy = *strategies.choose(&mut self.rng).unwrap_or(&Strategy::Mutate);

            let mut child = match strategy {
                Strategy::Create => self.generate(problem),
                Strategy::Mutate => self.mutate(problem, &parents[index]),
                Strategy::Crossover => self.crossover(problem, index, &mut parents),
            };

            if parents[index].fitness > child.fitness {
                let Some(max_age) = self.config.max_age else {
                    continue;
                };
                parents[index].age += 1;
                if max_age > parents[index].age {
                    continue;
                }

                // Share of past bests the child is no better than
                let below = historical_fitnesses.partition_point(|f| *f < child.fitness);
                let proportion_similar = below as f64 / historical_fitnesses.len() as f64;
                if self.rng.gen::<f64>() < (-proportion_similar).exp() {
                    parents[index] = child;
                    continue;
                }

                best.age = 0;
                parents[index] = best.clone();
                continue;
            }

            if !(child.fitness > parents[index].fitness) {
                // Same fitness: keep exploring but carry the age over
                child.age = parents[index].age + 1;
                parents[index] = child;
                continue;
            }

            child.age = 0;
            parents[index] = child.clone();

            if child.fitness > best.fitness {
                best = child;
                callback.on_improvement(&best, start.elapsed());
                strategies.push(best.strategy);
                historical_fitnesses.push(best.fitness);
                if self.is_optimal(&best) {
                    return Ok(self.finish(best, StopReason::OptimalFitness, iterations, start, callback));
                }
            }
        }
    }

    fn generate<P: GeneticProblem>(&mut self, problem: &mut P) -> Candidate<P::Genes> {
        let genes = problem.create(&mut self.rng);
        let fitness = problem.fitness(&genes);
        Candidate {
            genes,
            fitness,
            strategy: Strategy::Create,
            age: 0,
        }
    }

    fn mutate<P: GeneticProblem>(
        &mut self,
        problem: &mut P,
        parent: &Candidate<P::Genes>,
    ) -> Candidate<P::Genes> {
        let genes = problem.mutate(&parent.genes, &mut self.rng);
        let fitness = problem.fitness(&genes);
        Candidate {
            genes,
            fitness,
            strategy: Strategy::Mutate,
            age: 0,
        }
    }

    fn crossover<P: GeneticProblem>(
        &mut self,
        problem: &mut P,
        index: usize,
        parents: &mut [Candidate<P::Genes>],
    ) -> Candidate<P::Genes> {
        if parents.len() < 2 {
            return self.mutate(problem, &parents[index]);
        }

        let mut donor_index = self.rng.gen_range(0..parents.len());
        if donor_index == index {
            donor_index = (donor_index + 1) % parents.len();
        }

        match problem.crossover(&parents[index].genes, &parents[donor_index].genes, &mut self.rng) {
            Some(genes) => {
                let fitness = problem.fitness(&genes);
                Candidate {
                    genes,
                    fitness,
                    strategy: Strategy::Crossover,
                    age: 0,
                }
            }
            None => {
                // Parent and donor are the same model: refresh the donor slot
                parents[donor_index] = self.generate(problem);
                let parent = parents[index].clone();
                self.mutate(problem, &parent)
            }
        }
    }

    fn is_optimal<G>(&self, candidate: &Candidate<G>) -> bool {
        !(self.config.optimal_fitness > candidate.fitness)
    }

    fn should_stop(&self, iterations: usize, start: Instant) -> Option<StopReason> {
        if let Some(flag) = &self.cancelled {
            if flag.load(Ordering::Relaxed) {
                return Some(StopReason::Cancelled);
            }
        }
        if let Some(max) = self.config.max_iterations {
            if iterations >= max {
                return Some(StopReason::IterationLimit);
            }
        }
        if let Some(max) = self.config.max_duration {
            if start.elapsed() >= max {
                return Some(StopReason::TimeLimit);
            }
        }
        None
    }

    fn finish<G, C: ProgressCallback<G>>(
        &self,
        best: Candidate<G>,
        stop_reason: StopReason,
        iterations: usize,
        start: Instant,
        callback: &mut C,
    ) -> SearchOutcome<G> {
        let outcome = SearchOutcome {
            best,
            stop_reason,
            iterations,
            elapsed: start.elapsed(),
        };
        log::info!(
            "Search stopped ({:?}) after {} iterations, best fitness {:.4}",
            outcome.stop_reason,
            outcome.iterations,
            outcome.best.fitness
        );
        callback.on_finished(&outcome);
        outcome
    }
}

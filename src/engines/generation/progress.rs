use super::engine::{Candidate, ProgressCallback, SearchOutcome, StopReason, Strategy};
use std::fmt::Display;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Reports every improvement through the `log` facade
pub struct LogProgressCallback;

impl<G: Display> ProgressCallback<G> for LogProgressCallback {
    fn on_improvement(&mut self, candidate: &Candidate<G>, elapsed: Duration) {
        log::info!(
            "Genes: {} | Fitness: {:.4} | Strategy: {:?} | Time: {:.1?}",
            candidate.genes,
            candidate.fitness,
            candidate.strategy,
            elapsed
        );
    }

    fn on_finished(&mut self, outcome: &SearchOutcome<G>) {
        log::info!(
            "Best model: {} (fitness {:.4}, {:?})",
            outcome.best.genes,
            outcome.best.fitness,
            outcome.stop_reason
        );
    }
}

// For streaming progress to another thread
pub struct ChannelProgressCallback<G> {
    sender: Sender<ProgressMessage<G>>,
}

#[derive(Debug, Clone)]
pub enum ProgressMessage<G> {
    Improvement {
        genes: G,
        fitness: f64,
        strategy: Strategy,
        elapsed: Duration,
    },
    Finished {
        fitness: f64,
        stop_reason: StopReason,
        iterations: usize,
    },
}

impl<G> ChannelProgressCallback<G> {
    pub fn new(sender: Sender<ProgressMessage<G>>) -> Self {
        Self { sender }
    }
}

impl<G: Clone> ProgressCallback<G> for ChannelProgressCallback<G> {
    fn on_improvement(&mut self, candidate: &Candidate<G>, elapsed: Duration) {
        let _ = self.sender.send(ProgressMessage::Improvement {
            genes: candidate.genes.clone(),
            fitness: candidate.fitness,
            strategy: candidate.strategy,
            elapsed,
        });
    }

    fn on_finished(&mut self, outcome: &SearchOutcome<G>) {
        let _ = self.sender.send(ProgressMessage::Finished {
            fitness: outcome.best.fitness,
            stop_reason: outcome.stop_reason,
            iterations: outcome.iterations,
        });
    }
}

/// Forwards every event to both callbacks
pub struct Tee<A, B>(pub A, pub B);

impl<G, A: ProgressCallback<G>, B: ProgressCallback<G>> ProgressCallback<G> for Tee<A, B> {
    fn on_improvement(&mut self, candidate: &Candidate<G>, elapsed: Duration) {
        self.0.on_improvement(candidate, elapsed);
        self.1.on_improvement(candidate, elapsed);
    }

    fn on_finished(&mut self, outcome: &SearchOutcome<G>) {
        self.0.on_finished(outcome);
        self.1.on_finished(outcome);
    }
}

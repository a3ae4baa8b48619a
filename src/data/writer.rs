use crate::engines::evaluation::CacheStats;
use crate::engines::generation::{Gene, Genotype, SearchOutcome, StopReason, Strategy};
use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The record persisted at the end of a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModel {
    pub genes: Vec<Gene>,
    pub fitness: f64,
    pub strategy: Strategy,
    pub age: usize,
    pub iterations: usize,
    pub elapsed_seconds: f64,
    pub evaluations: usize,
    pub cache: CacheStats,
    pub stop_reason: StopReason,
    /// RFC 3339
    pub created_at: String,
}

impl BestModel {
    pub fn from_outcome(outcome: &SearchOutcome<Genotype>, evaluations: usize, cache: CacheStats) -> Self {
        Self {
            genes: outcome.best.genes.genes().to_vec(),
            fitness: outcome.best.fitness,
            strategy: outcome.best.strategy,
            age: outcome.best.age,
            iterations: outcome.iterations,
            elapsed_seconds: outcome.elapsed.as_secs_f64(),
            evaluations,
            cache,
            stop_reason: outcome.stop_reason,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn genotype(&self) -> Genotype {
        Genotype::from_genes(self.genes.iter().copied())
    }
}

pub struct BestModelWriter;

impl BestModelWriter {
    pub fn write<P: AsRef<Path>>(path: P, model: &BestModel) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(model)?;
        std::fs::write(path, json)?;
        log::info!("Wrote best model to {}", path.display());
        Ok(())
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<BestModel> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::Candidate;
    use std::time::Duration;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("best.json");

        let outcome = SearchOutcome {
            best: Candidate {
                genes: Genotype::from_genes([Gene::River, Gene::RiverOut]),
                fitness: 0.81,
                strategy: Strategy::Crossover,
                age: 2,
            },
            stop_reason: StopReason::IterationLimit,
            iterations: 40,
            elapsed: Duration::from_millis(1500),
        };
        let model = BestModel::from_outcome(&outcome, 12, CacheStats::default());
        BestModelWriter::write(&path, &model).unwrap();

        let loaded = BestModelWriter::read(&path).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(loaded.genotype(), outcome.best.genes);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"river_out\""));
        assert!(chrono::DateTime::parse_from_rfc3339(&loaded.created_at).is_ok());
    }
}

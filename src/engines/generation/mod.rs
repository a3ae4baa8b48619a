pub mod genes;
pub mod genome;
pub mod validator;
pub mod creation;
pub mod operators;
pub mod engine;
pub mod progress;

pub use genes::{Gene, GeneFamily, GeneUniverse, OUTLET_MARKER};
pub use genome::{Genotype, GenotypeKey};
pub use validator::StructuralValidator;
pub use creation::Creator;
pub use operators::{crossover, MutationKind, Mutator};
pub use engine::{
    Candidate, EngineConfig, EvolutionEngine, GeneticProblem, ProgressCallback, SearchOutcome,
    StopReason, Strategy,
};
pub use progress::{ChannelProgressCallback, LogProgressCallback, ProgressMessage, Tee};

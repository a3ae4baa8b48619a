pub mod evaluation;
pub mod generation;
pub mod runner;
pub mod search;

pub use runner::SearchRunner;
pub use search::{LumpedModelProblem, ModelSearch};

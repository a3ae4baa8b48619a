pub mod forcing;
pub mod writer;

pub use forcing::{CsvForcingLoader, ForcingData, ForcingSeries, ForcingWindow};
pub use writer::{BestModel, BestModelWriter};

pub mod objective;
pub mod distribution;
pub mod evapotranspiration;
pub mod algorithm;
pub mod registry;

pub use objective::ObjectiveFunction;
pub use distribution::ParameterDistribution;
pub use evapotranspiration::EtMethod;
pub use algorithm::Algorithm;
pub use registry::Techniques;

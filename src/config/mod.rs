pub mod traits;
pub mod search;
pub mod calibration;
pub mod period;
pub mod cache;
pub mod manager;

pub use manager::{AppConfig, ConfigManager, ENV_PREFIX};
pub use search::SearchConfig;
pub use calibration::{CalibrationConfig, ExecutionMode, Persistence};
pub use period::PeriodConfig;
pub use cache::{CacheConfig, OutputConfig};
pub use traits::ConfigSection;

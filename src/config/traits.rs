use crate::error::AcmeError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), AcmeError>;
}

pub(crate) fn invalid(section: &str, message: &str) -> AcmeError {
    AcmeError::Configuration(format!("[{}] {}", section, message))
}

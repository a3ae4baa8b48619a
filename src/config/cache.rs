use super::traits::{invalid, ConfigSection};
use crate::error::AcmeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Least recently used entries are evicted beyond this many models.
    /// `None` keeps every evaluated model for the whole run.
    pub capacity: Option<usize>,
}

impl ConfigSection for CacheConfig {
    fn section_name() -> &'static str {
        "cache"
    }

    fn validate(&self) -> Result<(), AcmeError> {
        if self.capacity == Some(0) {
            return Err(invalid(Self::section_name(), "Capacity must be positive, omit it for no bound"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the best model is written when the search finishes
    pub path: Option<PathBuf>,
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), AcmeError> {
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(invalid(Self::section_name(), "Output path must not be empty"));
            }
        }
        Ok(())
    }
}

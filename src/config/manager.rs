use super::{
    cache::{CacheConfig, OutputConfig},
    calibration::CalibrationConfig,
    period::PeriodConfig,
    search::SearchConfig,
    traits::ConfigSection,
};
use crate::error::AcmeError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix of environment overrides, e.g. `ACME__SEARCH__POOL_SIZE=20`
pub const ENV_PREFIX: &str = "ACME";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub calibration: CalibrationConfig,
    pub period: PeriodConfig,
    pub cache: CacheConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Parse and validate a TOML document without environment overrides
    pub fn from_toml_str(contents: &str) -> Result<Self, AcmeError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AcmeError> {
        self.search.validate()?;
        self.calibration.validate()?;
        self.period.validate()?;
        self.cache.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML or JSON file, then apply `ACME__*` environment overrides
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), AcmeError> {
        self.load_layered(path, ENV_PREFIX)
    }

    pub fn load_layered<P: AsRef<Path>>(&self, path: P, env_prefix: &str) -> Result<(), AcmeError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AcmeError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(
                ::config::Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), AcmeError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply `f` and keep the result only if it still validates
    pub fn update<F>(&self, f: F) -> Result<(), AcmeError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut updated = config.clone();
        f(&mut updated);
        updated.validate()?;
        *config = updated;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

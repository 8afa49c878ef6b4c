use super::{
    classifier::ClassifierConfig,
    dataset::DatasetConfig,
    ensemble::EnsembleConfig,
    evolution::EvolutionConfig,
    traits::ConfigSection,
};
use crate::error::EnsembleError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix of environment variables that override file settings,
/// e.g. `GPENSEMBLE__ENSEMBLE__POOL_SIZE=20`.
pub const ENV_PREFIX: &str = "GPENSEMBLE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ensemble: EnsembleConfig,
    pub evolution: EvolutionConfig,
    pub classifier: ClassifierConfig,
    pub dataset: DatasetConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), EnsembleError> {
        self.ensemble.validate()?;
        self.evolution.validate()?;
        self.classifier.validate()?;
        self.dataset.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML/JSON file, apply environment overrides, then validate.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EnsembleError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.as_ref().display());
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EnsembleError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| EnsembleError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply an edit; the previous configuration is kept if the edit does not validate.
    pub fn update<F>(&self, f: F) -> Result<(), EnsembleError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}

use super::traits::ConfigSection;
use crate::error::EnsembleError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input files for the command-line runner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub train_path: Option<PathBuf>,
    pub test_path: Option<PathBuf>,
    pub label_columns: Vec<String>,
}

impl ConfigSection for DatasetConfig {
    fn section_name() -> &'static str {
        "dataset"
    }

    fn validate(&self) -> Result<(), EnsembleError> {
        if self.train_path.is_some() && self.label_columns.is_empty() {
            return Err(EnsembleError::Configuration(
                "A training file needs at least one label column".to_string()
            ));
        }
        Ok(())
    }
}

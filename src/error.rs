use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error("Invalid label subset: {0}")]
    InvalidLabelSubset(String),

    #[error("Classifier training failed for pool slot {slot}: {reason}")]
    ClassifierTraining { slot: usize, reason: String },

    #[error("Structural bound violation: {0}")]
    StructuralBoundViolation(String),

    #[error("Genotype tree has no leaves")]
    EmptyGenotype,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, EnsembleError>;

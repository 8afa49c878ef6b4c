pub mod traits;
pub mod ensemble;
pub mod evolution;
pub mod classifier;
pub mod dataset;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use ensemble::EnsembleConfig;
pub use evolution::EvolutionConfig;
pub use classifier::{ClassifierConfig, ClassifierKind};
pub use dataset::DatasetConfig;
pub use traits::ConfigSection;

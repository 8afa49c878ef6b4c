use super::traits::ConfigSection;
use crate::engines::generation::tree::TreeBounds;
use crate::error::EnsembleError;
use serde::{Deserialize, Serialize};

/// Bound parameters of the ensemble search and the base classifier pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Number of base classifiers in the pool
    pub pool_size: usize,
    /// Fraction of the training set bootstrap-sampled for each base classifier
    pub sample_ratio: f64,
    /// `None` trains every slot on the full label set
    pub label_subset_size: Option<usize>,
    pub max_depth: usize,
    pub max_children: usize,
    /// Bound on distinct classifier references per tree; defaults to `pool_size`
    pub n_max: Option<usize>,
    pub random_seed: Option<u64>,
    /// Swap attempts before crossover falls back to copies of the parents
    pub crossover_retries: usize,
    /// Actions tried before mutation falls back to a copy of the input
    pub mutation_attempts: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            sample_ratio: 0.75,
            label_subset_size: None,
            max_depth: 4,
            max_children: 2,
            n_max: None,
            random_seed: None,
            crossover_retries: 10,
            mutation_attempts: 10,
        }
    }
}

impl EnsembleConfig {
    pub fn effective_n_max(&self) -> usize {
        self.n_max.unwrap_or(self.pool_size)
    }

    pub fn bounds(&self) -> TreeBounds {
        TreeBounds {
            max_depth: self.max_depth,
            max_children: self.max_children,
            n_max: self.effective_n_max(),
            pool_size: self.pool_size,
        }
    }
}

impl ConfigSection for EnsembleConfig {
    fn section_name() -> &'static str {
        "ensemble"
    }

    fn validate(&self) -> Result<(), EnsembleError> {
        if self.pool_size == 0 {
            return Err(EnsembleError::Configuration(
                "Pool size must be at least 1".to_string()
            ));
        }
        if !(self.sample_ratio > 0.0 && self.sample_ratio <= 1.0) {
            return Err(EnsembleError::Configuration(
                "Sample ratio must be in (0, 1]".to_string()
            ));
        }
        if self.label_subset_size == Some(0) {
            return Err(EnsembleError::Configuration(
                "Label subset size must be at least 1".to_string()
            ));
        }
        if self.max_children == 0 {
            return Err(EnsembleError::Configuration(
                "Max children must be at least 1".to_string()
            ));
        }
        let n_max = self.effective_n_max();
        if n_max == 0 || n_max > self.pool_size {
            return Err(EnsembleError::Configuration(format!(
                "n_max must be between 1 and the pool size ({}), got {}",
                self.pool_size, n_max
            )));
        }
        if self.crossover_retries == 0 || self.mutation_attempts == 0 {
            return Err(EnsembleError::Configuration(
                "Retry budgets must be at least 1".to_string()
            ));
        }
        Ok(())
    }
}

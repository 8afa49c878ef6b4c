use super::traits::ConfigSection;
use crate::engines::metrics::QualityMetric;
use crate::error::EnsembleError;
use serde::{Deserialize, Serialize};

/// Parameters of the steady-state driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub offspring_per_generation: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub tournament_size: usize,
    pub metric: QualityMetric,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 50,
            offspring_per_generation: 10,
            crossover_rate: 0.8,
            mutation_rate: 0.2,
            tournament_size: 2,
            metric: QualityMetric::ExampleFMeasure,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), EnsembleError> {
        if self.population_size < 2 {
            return Err(EnsembleError::Configuration(
                "Population size must be at least 2".to_string()
            ));
        }
        if self.tournament_size == 0 {
            return Err(EnsembleError::Configuration(
                "Tournament size must be at least 1".to_string()
            ));
        }
        if self.mutation_rate < 0.0 || self.mutation_rate > 1.0 {
            return Err(EnsembleError::Configuration(
                "Mutation rate must be between 0 and 1".to_string()
            ));
        }
        if self.crossover_rate < 0.0 || self.crossover_rate > 1.0 {
            return Err(EnsembleError::Configuration(
                "Crossover rate must be between 0 and 1".to_string()
            ));
        }
        Ok(())
    }
}

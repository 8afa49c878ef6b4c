use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::generation::{
    operators::tournament_selection,
    problem::EnsembleProblem,
    tree::GenotypeTree,
};
use crate::error::{EnsembleError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Summary of one generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub replacements: usize,
}

/// Result of a full run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionOutcome {
    pub best: GenotypeTree,
    pub best_fitness: f64,
    pub history: Vec<GenerationStats>,
    pub finished_at: String,
}

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats);
}

/// Steady-state driver: each generation breeds a batch of offspring, and each child
/// replaces the current worst individual when it scores strictly higher and is not
/// already in the population. Population size never changes.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    problem: EnsembleProblem,
    rng: StdRng,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig, problem: EnsembleProblem, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            problem,
            rng,
        }
    }

    pub fn problem(&self) -> &EnsembleProblem {
        &self.problem
    }

    /// Run the evolution process
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<EvolutionOutcome> {
        self.config.validate()?;
        let mut population = self
            .problem
            .initialize_population(self.config.population_size, &mut self.rng);
        let mut fitness = self.problem.evaluate_population(&population)?;
        let mut history = Vec::with_capacity(self.config.generations);

        log::info!(
            "Initial population of {} trees, best fitness {:.4}",
            population.len(),
            best_of(&fitness).1
        );

        for generation in 0..self.config.generations {
            callback.on_generation_start(generation);

            let offspring = self.breed(&population, &fitness);
            let offspring_fitness = self.problem.evaluate_population(&offspring)?;

            let mut replacements = 0;
            for (child, child_fitness) in offspring.into_iter().zip(offspring_fitness) {
                let worst = worst_of(&fitness);
                if child_fitness > fitness[worst] && !population.contains(&child) {
                    population[worst] = child;
                    fitness[worst] = child_fitness;
                    replacements += 1;
                }
            }

            let stats = GenerationStats {
                generation,
                best_fitness: best_of(&fitness).1,
                mean_fitness: fitness.iter().sum::<f64>() / fitness.len() as f64,
                replacements,
            };
            callback.on_generation_complete(&stats);
            history.push(stats);
        }

        let (best_idx, best_fitness) = best_of(&fitness);
        let best = population
            .get(best_idx)
            .cloned()
            .ok_or_else(|| EnsembleError::Configuration("Population is empty".to_string()))?;

        log::info!("Best ensemble {} with fitness {:.4}", best, best_fitness);

        Ok(EvolutionOutcome {
            best,
            best_fitness,
            history,
            finished_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn breed(&mut self, population: &[GenotypeTree], fitness: &[f64]) -> Vec<GenotypeTree> {
        let target = self.config.offspring_per_generation;
        let mut offspring = Vec::with_capacity(target);

        while offspring.len() < target {
            let p1 = tournament_selection(fitness, self.config.tournament_size, &mut self.rng);
            let p2 = tournament_selection(fitness, self.config.tournament_size, &mut self.rng);

            let (mut child1, mut child2) = if self.rng.gen::<f64>() < self.config.crossover_rate {
                self.problem
                    .crossover(&population[p1], &population[p2], &mut self.rng)
            } else {
                (population[p1].clone(), population[p2].clone())
            };

            if self.rng.gen::<f64>() < self.config.mutation_rate {
                child1 = self.problem.mutate(&child1, &mut self.rng);
            }
            if self.rng.gen::<f64>() < self.config.mutation_rate {
                child2 = self.problem.mutate(&child2, &mut self.rng);
            }

            offspring.push(child1);
            if offspring.len() < target {
                offspring.push(child2);
            }
        }

        offspring
    }
}

fn best_of(fitness: &[f64]) -> (usize, f64) {
    fitness
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((0, 0.0))
}

fn worst_of(fitness: &[f64]) -> usize {
    fitness
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

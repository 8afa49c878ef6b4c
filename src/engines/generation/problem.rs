use super::initializer::initialize_population;
use super::operators::{crossover, mutate};
use super::tree::{GenotypeTree, TreeBounds};
use crate::classifiers::{ClassifierPool, MultiLabelLearner};
use crate::config::{ConfigSection, EnsembleConfig};
use crate::data::MultiLabelDataset;
use crate::engines::evaluation::{EnsembleClassifier, Evaluator};
use crate::engines::metrics::QualityMetric;
use crate::error::{EnsembleError, Result};
use rand::Rng;
use std::sync::Arc;

/// Everything an evolutionary driver needs: random trees, variation operators,
/// fitness, and the bound parameters.
///
/// The classifier pool is trained once on bootstrap samples of the training set.
/// Individuals are trees whose leaves reference pool members and whose internal nodes
/// aggregate their children's per-label outputs.
pub struct EnsembleProblem {
    config: EnsembleConfig,
    bounds: TreeBounds,
    evaluator: Evaluator,
}

impl EnsembleProblem {
    pub fn new(config: EnsembleConfig, evaluator: Evaluator) -> Result<Self> {
        config.validate()?;
        let bounds = config.bounds();
        bounds.validate()?;
        if evaluator.pool().len() != config.pool_size {
            return Err(EnsembleError::Configuration(format!(
                "Pool has {} classifiers, configuration expects {}",
                evaluator.pool().len(),
                config.pool_size
            )));
        }

        Ok(Self {
            config,
            bounds,
            evaluator,
        })
    }

    /// Train the pool on `train` and score trees on the same data.
    pub fn build<R: Rng>(
        train: &MultiLabelDataset,
        config: EnsembleConfig,
        learner: &dyn MultiLabelLearner,
        metric: QualityMetric,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        let pool = Arc::new(ClassifierPool::build(train, &config, learner, rng)?);
        let evaluator = Evaluator::new(pool, train, metric)?;
        Self::new(config, evaluator)
    }

    pub fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<GenotypeTree> {
        initialize_population(size, &self.bounds, rng)
    }

    pub fn crossover<R: Rng>(
        &self,
        parent1: &GenotypeTree,
        parent2: &GenotypeTree,
        rng: &mut R,
    ) -> (GenotypeTree, GenotypeTree) {
        crossover(parent1, parent2, &self.bounds, self.config.crossover_retries, rng)
    }

    pub fn mutate<R: Rng>(&self, tree: &GenotypeTree, rng: &mut R) -> GenotypeTree {
        mutate(tree, &self.bounds, self.config.mutation_attempts, rng)
    }

    pub fn evaluate(&self, tree: &GenotypeTree) -> Result<f64> {
        self.evaluator.fitness(tree)
    }

    pub fn evaluate_population(&self, trees: &[GenotypeTree]) -> Result<Vec<f64>> {
        self.evaluator.evaluate_population(trees)
    }

    /// Bind a tree to the pool for predicting unseen instances
    pub fn ensemble(&self, tree: GenotypeTree) -> Result<EnsembleClassifier> {
        tree.validate(&self.bounds)?;
        EnsembleClassifier::new(tree, Arc::clone(self.evaluator.pool()))
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn pool(&self) -> &Arc<ClassifierPool> {
        self.evaluator.pool()
    }

    pub fn bounds(&self) -> &TreeBounds {
        &self.bounds
    }

    pub fn max_depth(&self) -> usize {
        self.bounds.max_depth
    }

    pub fn max_children(&self) -> usize {
        self.bounds.max_children
    }

    pub fn n_max(&self) -> usize {
        self.bounds.n_max
    }

    pub fn pool_size(&self) -> usize {
        self.bounds.pool_size
    }

    pub fn sample_ratio(&self) -> f64 {
        self.config.sample_ratio
    }
}

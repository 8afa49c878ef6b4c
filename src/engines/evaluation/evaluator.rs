use crate::classifiers::ClassifierPool;
use crate::data::MultiLabelDataset;
use crate::engines::generation::tree::{GenotypeTree, Node};
use crate::engines::metrics::{MetricsEngine, QualityMetric};
use crate::error::{EnsembleError, Result};
use crate::types::{Instance, LabelConfidences};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Combine a tree bottom-up. `leaf` supplies the confidences of a pool classifier.
pub fn aggregate<F>(node: &Node, leaf: &F) -> Result<LabelConfidences>
where
    F: Fn(usize) -> Result<LabelConfidences>,
{
    match node {
        Node::Leaf(index) => leaf(*index),
        Node::Internal { op, children } => {
            let outputs = children
                .iter()
                .map(|child| aggregate(child, leaf))
                .collect::<Result<Vec<_>>>()?;
            Ok(op.combine(&outputs))
        }
    }
}

/// Ensemble prediction of `tree` for one instance of the pool's label space.
pub fn evaluate(tree: &GenotypeTree, instance: &Instance, pool: &ClassifierPool) -> Result<LabelConfidences> {
    aggregate(tree.root(), &|index| {
        pool.get(index)
            .ok_or_else(|| {
                EnsembleError::StructuralBoundViolation(format!(
                    "Leaf references classifier {} but the pool has {}",
                    index,
                    pool.len()
                ))
            })?
            .predict(instance)
    })
}

/// Fitness of genotype trees on a fixed evaluation set.
///
/// Every classifier's confidences for every evaluation instance are computed once at
/// construction; scoring a tree only aggregates those. Holds no mutable state, so
/// `fitness` can be called from many threads at once.
pub struct Evaluator {
    pool: Arc<ClassifierPool>,
    metric: QualityMetric,
    truth: Vec<Vec<bool>>,
    /// `predictions[classifier][instance]`
    predictions: Vec<Vec<LabelConfidences>>,
}

impl Evaluator {
    pub fn new(pool: Arc<ClassifierPool>, evaluation_set: &MultiLabelDataset, metric: QualityMetric) -> Result<Self> {
        if evaluation_set.label_ids() != pool.label_ids() {
            return Err(EnsembleError::Dataset(format!(
                "Evaluation labels {:?} differ from the pool label space {:?}",
                evaluation_set.label_ids(),
                pool.label_ids()
            )));
        }

        let instances = evaluation_set.instances()?;
        let predictions = pool
            .classifiers()
            .par_iter()
            .map(|classifier| {
                instances
                    .iter()
                    .map(|instance| classifier.predict(instance))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Cached predictions of {} classifiers on {} evaluation instances",
            pool.len(),
            instances.len()
        );

        Ok(Self {
            pool,
            metric,
            truth: instances.into_iter().map(|i| i.labels).collect(),
            predictions,
        })
    }

    pub fn pool(&self) -> &Arc<ClassifierPool> {
        &self.pool
    }

    pub fn metric(&self) -> QualityMetric {
        self.metric
    }

    pub fn num_instances(&self) -> usize {
        self.truth.len()
    }

    /// Ensemble confidences for evaluation instance `row`
    pub fn predict_row(&self, tree: &GenotypeTree, row: usize) -> Result<LabelConfidences> {
        aggregate(tree.root(), &|index| {
            self.predictions
                .get(index)
                .and_then(|rows| rows.get(row))
                .cloned()
                .ok_or_else(|| {
                    EnsembleError::StructuralBoundViolation(format!(
                        "No cached prediction for classifier {} on row {}",
                        index, row
                    ))
                })
        })
    }

    /// Bipartitions for every evaluation instance
    pub fn predict_all(&self, tree: &GenotypeTree) -> Result<Vec<Vec<bool>>> {
        (0..self.num_instances())
            .map(|row| self.predict_row(tree, row).map(|c| c.bipartition()))
            .collect()
    }

    /// Quality of the ensemble on the evaluation set, higher is better
    pub fn fitness(&self, tree: &GenotypeTree) -> Result<f64> {
        let predicted = self.predict_all(tree)?;
        Ok(self.metric.compute(&predicted, &self.truth))
    }

    /// Score trees in parallel, in input order
    pub fn evaluate_population(&self, trees: &[GenotypeTree]) -> Result<Vec<f64>> {
        trees.par_iter().map(|tree| self.fitness(tree)).collect()
    }

    pub fn report(&self, tree: &GenotypeTree) -> Result<HashMap<String, f64>> {
        let predicted = self.predict_all(tree)?;
        Ok(MetricsEngine::calculate_all(&predicted, &self.truth))
    }
}

/// An evolved tree bound to the pool it references
#[derive(Debug, Clone)]
pub struct EnsembleClassifier {
    tree: GenotypeTree,
    pool: Arc<ClassifierPool>,
}

impl EnsembleClassifier {
    pub fn new(tree: GenotypeTree, pool: Arc<ClassifierPool>) -> Result<Self> {
        tree.validate_structure()?;
        if let Some(&max) = tree.distinct_leaves().iter().next_back() {
            if max >= pool.len() {
                return Err(EnsembleError::StructuralBoundViolation(format!(
                    "Tree references classifier {} but the pool has {}",
                    max,
                    pool.len()
                )));
            }
        }
        Ok(Self { tree, pool })
    }

    pub fn tree(&self) -> &GenotypeTree {
        &self.tree
    }

    pub fn predict_confidences(&self, instance: &Instance) -> Result<LabelConfidences> {
        evaluate(&self.tree, instance, &self.pool)
    }

    /// Label bipartition; labels no leaf covers are negative
    pub fn predict(&self, instance: &Instance) -> Result<Vec<bool>> {
        self.predict_confidences(instance).map(|c| c.bipartition())
    }

    /// All metrics on a labelled dataset of the pool's label space
    pub fn score(&self, dataset: &MultiLabelDataset) -> Result<HashMap<String, f64>> {
        let instances = dataset.instances()?;
        let predicted = instances
            .par_iter()
            .map(|instance| self.predict(instance))
            .collect::<Result<Vec<_>>>()?;
        let truth: Vec<Vec<bool>> = instances.into_iter().map(|i| i.labels).collect();
        Ok(MetricsEngine::calculate_all(&predicted, &truth))
    }
}

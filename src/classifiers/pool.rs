use super::traits::{MultiLabelLearner, MultiLabelModel};
use crate::config::{ConfigSection, EnsembleConfig};
use crate::data::{bootstrap_indices, random_label_subset, LabelSubset, LabelSubsetTransformer, MultiLabelDataset};
use crate::error::{EnsembleError, Result};
use crate::types::{Instance, LabelConfidences, LabelId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// A trained pool member.
///
/// Owns the model, the transformer for the label subset it was trained on, and the
/// seed of its bootstrap sample. Never mutated after the pool is built.
#[derive(Debug)]
pub struct BaseClassifier {
    model: Box<dyn MultiLabelModel>,
    transformer: LabelSubsetTransformer,
    seed: u64,
}

impl BaseClassifier {
    pub fn new(model: Box<dyn MultiLabelModel>, transformer: LabelSubsetTransformer, seed: u64) -> Result<Self> {
        if model.num_labels() != transformer.subset().len() {
            return Err(EnsembleError::Dataset(format!(
                "Model predicts {} labels but its label subset has {}",
                model.num_labels(),
                transformer.subset().len()
            )));
        }
        Ok(Self {
            model,
            transformer,
            seed,
        })
    }

    pub fn label_subset(&self) -> &LabelSubset {
        self.transformer.subset()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Confidences over the pool's label space; labels outside the subset are uncovered.
    pub fn predict(&self, instance: &Instance) -> Result<LabelConfidences> {
        let projected = self.transformer.project(instance)?;
        let confidences = self.model.predict(&projected)?;
        let positions = self.transformer.keep_positions();
        if confidences.len() != positions.len() {
            return Err(EnsembleError::Prediction(format!(
                "Model returned {} confidences for {} labels",
                confidences.len(),
                positions.len()
            )));
        }

        let mut out = LabelConfidences::uncovered(self.transformer.source_labels().len());
        for (&position, &confidence) in positions.iter().zip(&confidences) {
            out.set(position, confidence.clamp(0.0, 1.0));
        }
        Ok(out)
    }
}

struct SlotPlan {
    slot: usize,
    seed: u64,
    subset: LabelSubset,
}

/// Fixed-size set of base classifiers referenced by tree leaves
#[derive(Debug)]
pub struct ClassifierPool {
    classifiers: Vec<BaseClassifier>,
    label_ids: Vec<LabelId>,
}

impl ClassifierPool {
    /// Train `config.pool_size` classifiers, each on its own bootstrap sample.
    ///
    /// Seeds and label subsets are drawn from `rng` in slot order; training then runs
    /// in parallel. Any failed slot fails the whole build.
    pub fn build<R: Rng>(
        full: &MultiLabelDataset,
        config: &EnsembleConfig,
        learner: &dyn MultiLabelLearner,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        if full.num_instances() == 0 {
            return Err(EnsembleError::Dataset(
                "Cannot build a classifier pool from an empty dataset".to_string(),
            ));
        }
        if let Some(k) = config.label_subset_size {
            if k > full.num_labels() {
                return Err(EnsembleError::InvalidLabelSubset(format!(
                    "Label subset size {} exceeds the {} labels of the training set",
                    k,
                    full.num_labels()
                )));
            }
        }

        log::info!(
            "Building pool of {} {} classifiers (sample ratio {}, label subset size {:?})",
            config.pool_size,
            learner.name(),
            config.sample_ratio,
            config.label_subset_size
        );

        let mut plans = Vec::with_capacity(config.pool_size);
        for slot in 0..config.pool_size {
            let seed: u64 = rng.gen();
            let subset = match config.label_subset_size {
                Some(k) => LabelSubset::new(random_label_subset(full.label_ids(), k, rng)?)?,
                None => LabelSubset::full(full),
            };
            plans.push(SlotPlan { slot, seed, subset });
        }

        let classifiers = plans
            .into_par_iter()
            .map(|plan| train_slot(full, plan, config.sample_ratio, learner))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            classifiers,
            label_ids: full.label_ids().to_vec(),
        })
    }

    /// Assemble a pool from already trained classifiers over `label_ids`.
    pub fn from_classifiers(label_ids: Vec<LabelId>, classifiers: Vec<BaseClassifier>) -> Result<Self> {
        if classifiers.is_empty() {
            return Err(EnsembleError::Configuration("Pool must not be empty".to_string()));
        }
        for (slot, classifier) in classifiers.iter().enumerate() {
            if classifier.transformer.source_labels() != label_ids.as_slice() {
                return Err(EnsembleError::InvalidLabelSubset(format!(
                    "Classifier {} was built for a different label space",
                    slot
                )));
            }
        }
        Ok(Self {
            classifiers,
            label_ids,
        })
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BaseClassifier> {
        self.classifiers.get(index)
    }

    pub fn classifiers(&self) -> &[BaseClassifier] {
        &self.classifiers
    }

    /// Label space every classifier prediction is aligned to
    pub fn label_ids(&self) -> &[LabelId] {
        &self.label_ids
    }

    pub fn num_labels(&self) -> usize {
        self.label_ids.len()
    }
}

fn train_slot(
    full: &MultiLabelDataset,
    plan: SlotPlan,
    sample_ratio: f64,
    learner: &dyn MultiLabelLearner,
) -> Result<BaseClassifier> {
    let SlotPlan { slot, seed, subset } = plan;
    let failure = |reason: String| EnsembleError::ClassifierTraining { slot, reason };

    let mut slot_rng = StdRng::seed_from_u64(seed);
    let indices = bootstrap_indices(full.num_instances(), sample_ratio, &mut slot_rng)?;
    let sample = full.take_rows(&indices)?;

    let transformer = LabelSubsetTransformer::new(full, subset)?;
    let view = transformer.reduce(&sample)?;

    let model = learner
        .train(view.dataset())
        .map_err(|e| failure(e.to_string()))?;
    let classifier = BaseClassifier::new(model, transformer, seed).map_err(|e| failure(e.to_string()))?;

    log::debug!(
        "Trained pool slot {} on {} instances, labels {:?} (seed {})",
        slot,
        indices.len(),
        classifier.label_subset().ids(),
        seed
    );
    Ok(classifier)
}

use super::dataset::MultiLabelDataset;
use crate::error::{EnsembleError, Result};
use crate::types::{Instance, LabelId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, duplicate-free, non-empty list of label identifiers.
///
/// Serializes as a plain list; deserializing goes through [`LabelSubset::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<LabelId>", into = "Vec<LabelId>")]
pub struct LabelSubset(Vec<LabelId>);

impl TryFrom<Vec<LabelId>> for LabelSubset {
    type Error = EnsembleError;

    fn try_from(ids: Vec<LabelId>) -> Result<Self> {
        Self::new(ids)
    }
}

impl From<LabelSubset> for Vec<LabelId> {
    fn from(subset: LabelSubset) -> Self {
        subset.0
    }
}

impl LabelSubset {
    pub fn new(ids: Vec<LabelId>) -> Result<Self> {
        if ids.is_empty() {
            return Err(EnsembleError::InvalidLabelSubset(
                "Label subset must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(ids.len());
        for &id in &ids {
            if !seen.insert(id) {
                return Err(EnsembleError::InvalidLabelSubset(format!(
                    "Duplicate label identifier {}",
                    id
                )));
            }
        }
        Ok(Self(ids))
    }

    /// Every label of the dataset, in column order
    pub fn full(dataset: &MultiLabelDataset) -> Self {
        Self(dataset.label_ids().to_vec())
    }

    pub fn ids(&self) -> &[LabelId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A dataset restricted to the labels of a [`LabelSubset`]
#[derive(Debug, Clone)]
pub struct ReducedDataset {
    dataset: MultiLabelDataset,
    subset: LabelSubset,
}

impl ReducedDataset {
    pub fn dataset(&self) -> &MultiLabelDataset {
        &self.dataset
    }

    pub fn subset(&self) -> &LabelSubset {
        &self.subset
    }

    /// `original_label_indices()[i]` is the original identifier of reduced label `i`
    pub fn original_label_indices(&self) -> &[LabelId] {
        self.subset.ids()
    }

    pub fn into_dataset(self) -> MultiLabelDataset {
        self.dataset
    }
}

/// Label-column filter for one label subset over one source label space.
///
/// Configured once and never changed afterwards. The same value reduces whole datasets
/// and projects single out-of-sample instances.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSubsetTransformer {
    subset: LabelSubset,
    source_labels: Vec<LabelId>,
    /// Positions of the kept labels in the source label vector, in subset order
    keep_positions: Vec<usize>,
}

impl LabelSubsetTransformer {
    /// Configure the filter for `subset` against the label space of `source`.
    pub fn new(source: &MultiLabelDataset, subset: LabelSubset) -> Result<Self> {
        let keep_positions = subset
            .ids()
            .iter()
            .map(|&id| {
                source.label_position(id).ok_or_else(|| {
                    EnsembleError::InvalidLabelSubset(format!(
                        "Label {} is not in the dataset label space {:?}",
                        id,
                        source.label_ids()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            subset,
            source_labels: source.label_ids().to_vec(),
            keep_positions,
        })
    }

    pub fn subset(&self) -> &LabelSubset {
        &self.subset
    }

    pub fn original_label_indices(&self) -> &[LabelId] {
        self.subset.ids()
    }

    /// Positions in the source label vector that survive the filter
    pub fn keep_positions(&self) -> &[usize] {
        &self.keep_positions
    }

    pub fn source_labels(&self) -> &[LabelId] {
        &self.source_labels
    }

    /// Drop every label column outside the subset. Features and row order are kept.
    pub fn reduce(&self, dataset: &MultiLabelDataset) -> Result<ReducedDataset> {
        self.check_label_space(dataset.label_ids())?;

        let label_names: Vec<String> = self
            .keep_positions
            .iter()
            .map(|&p| dataset.label_names()[p].clone())
            .collect();
        let selection: Vec<&str> = dataset
            .feature_names()
            .iter()
            .chain(label_names.iter())
            .map(|s| s.as_str())
            .collect();

        let frame = dataset.frame().select(selection)?;
        let reduced = MultiLabelDataset::from_parts(
            frame,
            dataset.feature_names().to_vec(),
            label_names,
            self.subset.ids().to_vec(),
        );

        Ok(ReducedDataset {
            dataset: reduced,
            subset: self.subset.clone(),
        })
    }

    /// Apply the same label removal to a single instance of the source label space.
    ///
    /// An unlabelled instance (empty label vector) keeps its features and stays unlabelled.
    pub fn project(&self, instance: &Instance) -> Result<Instance> {
        if instance.labels.is_empty() {
            return Ok(instance.clone());
        }
        if instance.labels.len() != self.source_labels.len() {
            return Err(EnsembleError::Dataset(format!(
                "Instance has {} labels, transformer expects {}",
                instance.labels.len(),
                self.source_labels.len()
            )));
        }
        Ok(Instance::new(
            instance.features.clone(),
            self.keep_positions.iter().map(|&p| instance.labels[p]).collect(),
        ))
    }

    fn check_label_space(&self, labels: &[LabelId]) -> Result<()> {
        if labels != self.source_labels.as_slice() {
            return Err(EnsembleError::InvalidLabelSubset(format!(
                "Transformer was configured for labels {:?}, dataset has {:?}",
                self.source_labels, labels
            )));
        }
        Ok(())
    }
}

/// Reduce `dataset` to `subset`, returning the reduced view and the reusable transformer.
pub fn reduce(
    dataset: &MultiLabelDataset,
    subset: LabelSubset,
) -> Result<(ReducedDataset, LabelSubsetTransformer)> {
    let transformer = LabelSubsetTransformer::new(dataset, subset)?;
    let reduced = transformer.reduce(dataset)?;
    Ok((reduced, transformer))
}

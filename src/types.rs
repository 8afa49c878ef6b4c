use serde::{Deserialize, Serialize};

/// Identifier of a label in the original (full) label space
pub type LabelId = usize;

/// One row of a multi-label dataset.
///
/// `labels` is aligned with the `label_ids` of the dataset the instance came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub features: Vec<f64>,
    pub labels: Vec<bool>,
}

impl Instance {
    pub fn new(features: Vec<f64>, labels: Vec<bool>) -> Self {
        Self { features, labels }
    }
}

/// Per-label confidences over a fixed label space.
///
/// `None` means no classifier in the contributing subtree covers that label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfidences(Vec<Option<f64>>);

impl LabelConfidences {
    /// All labels uncovered
    pub fn uncovered(num_labels: usize) -> Self {
        Self(vec![None; num_labels])
    }

    pub fn from_values(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<f64> {
        self.0.get(position).copied().flatten()
    }

    pub fn set(&mut self, position: usize, confidence: f64) {
        self.0[position] = Some(confidence);
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.0
    }

    /// Positions covered by at least one classifier
    pub fn covered(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
    }

    /// Threshold at 0.5; uncovered labels are negative.
    pub fn bipartition(&self) -> Vec<bool> {
        self.0
            .iter()
            .map(|v| v.map(|c| c >= 0.5).unwrap_or(false))
            .collect()
    }
}

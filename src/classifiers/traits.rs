use crate::data::MultiLabelDataset;
use crate::error::Result;
use crate::types::Instance;
use std::fmt::Debug;

/// Induction algorithm for a multi-label model
pub trait MultiLabelLearner: Send + Sync {
    /// Display name
    fn name(&self) -> &'static str;

    /// Train on a dataset view; the model predicts that view's labels, in its column order.
    fn train(&self, data: &MultiLabelDataset) -> Result<Box<dyn MultiLabelModel>>;
}

/// Trained, immutable multi-label model
pub trait MultiLabelModel: Send + Sync + Debug {
    /// Number of labels the model predicts
    fn num_labels(&self) -> usize;

    /// Per-label confidence in [0, 1]
    fn predict(&self, instance: &Instance) -> Result<Vec<f64>>;
}

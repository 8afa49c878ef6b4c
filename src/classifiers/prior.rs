use super::traits::{MultiLabelLearner, MultiLabelModel};
use crate::data::MultiLabelDataset;
use crate::error::{EnsembleError, Result};
use crate::types::Instance;

/// Baseline learner: every prediction is the label frequency of the training view.
#[derive(Debug, Clone, Default)]
pub struct LabelPriorLearner;

impl MultiLabelLearner for LabelPriorLearner {
    fn name(&self) -> &'static str {
        "label prior"
    }

    fn train(&self, data: &MultiLabelDataset) -> Result<Box<dyn MultiLabelModel>> {
        let n = data.num_instances();
        if n == 0 {
            return Err(EnsembleError::Dataset(
                "Label prior needs at least one training instance".to_string(),
            ));
        }

        let mut positives = vec![0usize; data.num_labels()];
        for row in data.instances()? {
            for (count, label) in positives.iter_mut().zip(row.labels) {
                if label {
                    *count += 1;
                }
            }
        }

        Ok(Box::new(LabelPriorModel {
            frequencies: positives.into_iter().map(|c| c as f64 / n as f64).collect(),
        }))
    }
}

#[derive(Debug)]
pub struct LabelPriorModel {
    frequencies: Vec<f64>,
}

impl MultiLabelModel for LabelPriorModel {
    fn num_labels(&self) -> usize {
        self.frequencies.len()
    }

    fn predict(&self, _instance: &Instance) -> Result<Vec<f64>> {
        Ok(self.frequencies.clone())
    }
}

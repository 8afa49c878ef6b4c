use super::traits::{MultiLabelLearner, MultiLabelModel};
use crate::data::MultiLabelDataset;
use crate::error::{EnsembleError, Result};
use crate::types::Instance;

/// Multi-label k-nearest-neighbours.
///
/// The confidence for a label is the fraction of the `k` nearest training instances
/// (Euclidean distance, ties broken by row order) that carry the label.
#[derive(Debug, Clone)]
pub struct KnnLearner {
    k: usize,
}

impl KnnLearner {
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }
}

impl MultiLabelLearner for KnnLearner {
    fn name(&self) -> &'static str {
        "kNN"
    }

    fn train(&self, data: &MultiLabelDataset) -> Result<Box<dyn MultiLabelModel>> {
        if data.num_instances() == 0 {
            return Err(EnsembleError::Dataset(
                "kNN needs at least one training instance".to_string(),
            ));
        }
        Ok(Box::new(KnnModel {
            k: self.k,
            num_labels: data.num_labels(),
            rows: data.instances()?,
        }))
    }
}

#[derive(Debug)]
pub struct KnnModel {
    k: usize,
    num_labels: usize,
    rows: Vec<Instance>,
}

impl MultiLabelModel for KnnModel {
    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn predict(&self, instance: &Instance) -> Result<Vec<f64>> {
        let width = self.rows[0].features.len();
        if instance.features.len() != width {
            return Err(EnsembleError::Prediction(format!(
                "Expected {} features, got {}",
                width,
                instance.features.len()
            )));
        }

        let mut distances: Vec<(f64, usize)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (squared_distance(&row.features, &instance.features), i))
            .collect();
        distances.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let k = self.k.min(self.rows.len());
        let mut counts = vec![0usize; self.num_labels];
        for &(_, i) in distances.iter().take(k) {
            for (count, &label) in counts.iter_mut().zip(&self.rows[i].labels) {
                if label {
                    *count += 1;
                }
            }
        }

        Ok(counts.into_iter().map(|c| c as f64 / k as f64).collect())
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knn_votes_of_nearest_neighbours() {
        let data = MultiLabelDataset::from_rows(
            vec![vec![0.0], vec![0.1], vec![0.2], vec![10.0]],
            vec![
                vec![true, false],
                vec![true, true],
                vec![false, false],
                vec![false, true],
            ],
        )
        .unwrap();

        let model = KnnLearner::new(2).train(&data).unwrap();
        assert_eq!(model.num_labels(), 2);

        let near_origin = model.predict(&Instance::new(vec![0.0], vec![])).unwrap();
        assert_eq!(near_origin, vec![1.0, 0.5]);

        let far = model.predict(&Instance::new(vec![9.0], vec![])).unwrap();
        assert_eq!(far, vec![0.0, 0.5]);
    }

    #[test]
    fn test_knn_rejects_wrong_width() {
        let data = MultiLabelDataset::from_rows(vec![vec![0.0, 1.0]], vec![vec![true]]).unwrap();
        let model = KnnLearner::new(3).train(&data).unwrap();
        assert!(model.predict(&Instance::new(vec![0.0], vec![])).is_err());
    }
}

use crate::error::{EnsembleError, Result};
use crate::types::LabelId;
use rand::seq::SliceRandom;
use rand::Rng;

/// Bootstrap sample: `round(ratio * n)` row indices drawn with replacement (at least one).
pub fn bootstrap_indices<R: Rng>(n: usize, ratio: f64, rng: &mut R) -> Result<Vec<usize>> {
    if n == 0 {
        return Err(EnsembleError::Dataset(
            "Cannot sample from an empty dataset".to_string(),
        ));
    }
    let size = ((ratio * n as f64).round() as usize).max(1);
    Ok((0..size).map(|_| rng.gen_range(0..n)).collect())
}

/// `k` distinct labels drawn uniformly from `labels`, in draw order.
pub fn random_label_subset<R: Rng>(labels: &[LabelId], k: usize, rng: &mut R) -> Result<Vec<LabelId>> {
    if k == 0 || k > labels.len() {
        return Err(EnsembleError::InvalidLabelSubset(format!(
            "Cannot draw {} labels from a label space of {}",
            k,
            labels.len()
        )));
    }
    Ok(labels.choose_multiple(rng, k).copied().collect())
}

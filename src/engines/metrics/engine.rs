use super::multilabel::QualityMetric;
use std::collections::HashMap;

/// Full metric report for a set of multi-label predictions
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn calculate_all(predicted: &[Vec<bool>], truth: &[Vec<bool>]) -> HashMap<String, f64> {
        let mut all_metrics = HashMap::new();

        for metric in QualityMetric::ALL {
            all_metrics.insert(metric.name().to_string(), metric.compute(predicted, truth));
        }

        all_metrics.insert("num_instances".to_string(), truth.len() as f64);
        all_metrics.insert(
            "label_cardinality".to_string(),
            cardinality(predicted),
        );

        all_metrics
    }
}

/// Mean number of positive labels per row
fn cardinality(rows: &[Vec<bool>]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let positives: usize = rows.iter().map(|r| r.iter().filter(|&&b| b).count()).sum();
    positives as f64 / rows.len() as f64
}

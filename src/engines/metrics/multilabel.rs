use serde::{Deserialize, Serialize};

/// Multi-label quality metric. All scores lie in [0, 1], higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityMetric {
    ExampleFMeasure,
    HammingAccuracy,
    SubsetAccuracy,
    MacroFMeasure,
    MicroFMeasure,
}

impl QualityMetric {
    pub const ALL: [QualityMetric; 5] = [
        QualityMetric::ExampleFMeasure,
        QualityMetric::HammingAccuracy,
        QualityMetric::SubsetAccuracy,
        QualityMetric::MacroFMeasure,
        QualityMetric::MicroFMeasure,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QualityMetric::ExampleFMeasure => "example_f_measure",
            QualityMetric::HammingAccuracy => "hamming_accuracy",
            QualityMetric::SubsetAccuracy => "subset_accuracy",
            QualityMetric::MacroFMeasure => "macro_f_measure",
            QualityMetric::MicroFMeasure => "micro_f_measure",
        }
    }

    /// Score `predicted` against `truth`, row by row. Returns 0 for no rows.
    pub fn compute(&self, predicted: &[Vec<bool>], truth: &[Vec<bool>]) -> f64 {
        if predicted.is_empty() || truth.is_empty() {
            return 0.0;
        }
        match self {
            QualityMetric::ExampleFMeasure => example_f_measure(predicted, truth),
            QualityMetric::HammingAccuracy => hamming_accuracy(predicted, truth),
            QualityMetric::SubsetAccuracy => subset_accuracy(predicted, truth),
            QualityMetric::MacroFMeasure => macro_f_measure(predicted, truth),
            QualityMetric::MicroFMeasure => micro_f_measure(predicted, truth),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl Counts {
    fn add(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.tp += 1,
            (true, false) => self.fp += 1,
            (false, true) => self.fn_ += 1,
            (false, false) => {}
        }
    }

    /// F1; a label never predicted nor present scores 1
    fn f_measure(&self) -> f64 {
        let denominator = 2 * self.tp + self.fp + self.fn_;
        if denominator == 0 {
            return 1.0;
        }
        (2 * self.tp) as f64 / denominator as f64
    }
}

fn example_f_measure(predicted: &[Vec<bool>], truth: &[Vec<bool>]) -> f64 {
    let total: f64 = predicted
        .iter()
        .zip(truth)
        .map(|(p, t)| {
            let mut counts = Counts::default();
            for (&pi, &ti) in p.iter().zip(t) {
                counts.add(pi, ti);
            }
            counts.f_measure()
        })
        .sum();
    total / predicted.len().min(truth.len()) as f64
}

fn hamming_accuracy(predicted: &[Vec<bool>], truth: &[Vec<bool>]) -> f64 {
    let mut matches = 0usize;
    let mut cells = 0usize;
    for (p, t) in predicted.iter().zip(truth) {
        for (pi, ti) in p.iter().zip(t) {
            cells += 1;
            if pi == ti {
                matches += 1;
            }
        }
    }
    if cells == 0 {
        return 0.0;
    }
    matches as f64 / cells as f64
}

fn subset_accuracy(predicted: &[Vec<bool>], truth: &[Vec<bool>]) -> f64 {
    let exact = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    exact as f64 / predicted.len().min(truth.len()) as f64
}

fn per_label_counts(predicted: &[Vec<bool>], truth: &[Vec<bool>]) -> Vec<Counts> {
    let width = truth.first().map(|t| t.len()).unwrap_or(0);
    let mut counts = vec![Counts::default(); width];
    for (p, t) in predicted.iter().zip(truth) {
        for (label, (&pi, &ti)) in p.iter().zip(t).enumerate() {
            if let Some(c) = counts.get_mut(label) {
                c.add(pi, ti);
            }
        }
    }
    counts
}

fn macro_f_measure(predicted: &[Vec<bool>], truth: &[Vec<bool>]) -> f64 {
    let counts = per_label_counts(predicted, truth);
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().map(Counts::f_measure).sum::<f64>() / counts.len() as f64
}

fn micro_f_measure(predicted: &[Vec<bool>], truth: &[Vec<bool>]) -> f64 {
    let total = per_label_counts(predicted, truth)
        .into_iter()
        .fold(Counts::default(), |acc, c| Counts {
            tp: acc.tp + c.tp,
            fp: acc.fp + c.fp,
            fn_: acc.fn_ + c.fn_,
        });
    total.f_measure()
}

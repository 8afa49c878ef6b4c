pub mod engine;
pub mod multilabel;

pub use engine::MetricsEngine;
pub use multilabel::QualityMetric;

pub mod classifiers;
pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use classifiers::{BaseClassifier, ClassifierPool, KnnLearner, LabelPriorLearner, MultiLabelLearner, MultiLabelModel};
pub use data::{LabelSubset, LabelSubsetTransformer, MultiLabelDataset, ReducedDataset};
pub use engines::evaluation::{EnsembleClassifier, Evaluator};
pub use engines::generation::{
    AggregationOp, EnsembleProblem, EvolutionEngine, EvolutionOutcome, GenotypeTree, Node, TreeBounds,
};
pub use engines::metrics::QualityMetric;
pub use error::{EnsembleError, Result};
pub use types::{Instance, LabelConfidences, LabelId};

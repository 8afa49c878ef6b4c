pub mod evaluator;

pub use evaluator::{aggregate, evaluate, EnsembleClassifier, Evaluator};

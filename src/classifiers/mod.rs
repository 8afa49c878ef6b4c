pub mod traits;
pub mod knn;
pub mod prior;
pub mod pool;

pub use traits::{MultiLabelLearner, MultiLabelModel};
pub use knn::KnnLearner;
pub use prior::LabelPriorLearner;
pub use pool::{BaseClassifier, ClassifierPool};

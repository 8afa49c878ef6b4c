pub mod dataset;
pub mod transform;
pub mod sampling;
pub mod csv;

pub use dataset::MultiLabelDataset;
pub use transform::{reduce, LabelSubset, LabelSubsetTransformer, ReducedDataset};
pub use sampling::{bootstrap_indices, random_label_subset};
pub use csv::load_csv;

use super::dataset::MultiLabelDataset;
use crate::error::{EnsembleError, Result};
use polars::prelude::*;
use std::path::Path;

/// Load a CSV file with a header row; `label_columns` name the label attributes.
pub fn load_csv<P: AsRef<Path>>(path: P, label_columns: &[String]) -> Result<MultiLabelDataset> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()
        .map_err(|e| EnsembleError::Dataset(format!("Failed to read CSV: {}", e)))?;

    let dataset = MultiLabelDataset::from_frame(df, label_columns)?;
    log::info!(
        "Loaded {} instances ({} features, {} labels) from {}",
        dataset.num_instances(),
        dataset.num_features(),
        dataset.num_labels(),
        path.as_ref().display()
    );
    Ok(dataset)
}

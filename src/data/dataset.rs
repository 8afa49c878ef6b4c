use crate::error::{EnsembleError, Result};
use crate::types::{Instance, LabelId};
use polars::prelude::*;

/// Multi-label dataset backed by a polars `DataFrame`.
///
/// Feature columns are `Float64`, label columns are `Boolean`. Label columns carry
/// their identifier in the original label space, so derived datasets keep the mapping
/// back to the full label set.
#[derive(Debug, Clone)]
pub struct MultiLabelDataset {
    frame: DataFrame,
    feature_names: Vec<String>,
    label_names: Vec<String>,
    label_ids: Vec<LabelId>,
}

impl MultiLabelDataset {
    /// Build a dataset from row-major features and labels.
    ///
    /// Labels get identifiers `0..num_labels` and column names `label_{id}`.
    pub fn from_rows(features: Vec<Vec<f64>>, labels: Vec<Vec<bool>>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(EnsembleError::Dataset(format!(
                "{} feature rows but {} label rows",
                features.len(),
                labels.len()
            )));
        }

        let num_features = features.first().map(|r| r.len()).unwrap_or(0);
        let num_labels = labels.first().map(|r| r.len()).unwrap_or(0);
        if num_labels == 0 {
            return Err(EnsembleError::Dataset("Dataset has no labels".to_string()));
        }
        for (i, (f, l)) in features.iter().zip(&labels).enumerate() {
            if f.len() != num_features || l.len() != num_labels {
                return Err(EnsembleError::Dataset(format!("Ragged row at index {}", i)));
            }
        }

        let feature_names: Vec<String> = (0..num_features).map(|j| format!("f{}", j)).collect();
        let label_names: Vec<String> = (0..num_labels).map(|j| format!("label_{}", j)).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(num_features + num_labels);
        for (j, name) in feature_names.iter().enumerate() {
            let values: Vec<f64> = features.iter().map(|row| row[j]).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }
        for (j, name) in label_names.iter().enumerate() {
            let values: Vec<bool> = labels.iter().map(|row| row[j]).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
            feature_names,
            label_names,
            label_ids: (0..num_labels).collect(),
        })
    }

    /// Wrap an existing frame. Every column not listed in `label_columns` is a feature.
    ///
    /// Label identifiers follow the order of `label_columns`.
    pub fn from_frame(df: DataFrame, label_columns: &[String]) -> Result<Self> {
        if label_columns.is_empty() {
            return Err(EnsembleError::Dataset("No label columns given".to_string()));
        }

        let all_names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        for name in label_columns {
            if !all_names.contains(name) {
                return Err(EnsembleError::Dataset(format!("Missing label column {}", name)));
            }
        }
        let feature_names: Vec<String> = all_names
            .into_iter()
            .filter(|n| !label_columns.contains(n))
            .collect();

        let mut columns: Vec<Column> = Vec::with_capacity(feature_names.len() + label_columns.len());
        for name in &feature_names {
            columns.push(df.column(name)?.cast(&DataType::Float64)?);
        }
        for name in label_columns {
            let column = df.column(name)?.cast(&DataType::Boolean)?;
            if column.null_count() > 0 {
                log::warn!("Label column {} has {} nulls, treating them as negative", name, column.null_count());
            }
            columns.push(column);
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
            feature_names,
            label_names: label_columns.to_vec(),
            label_ids: (0..label_columns.len()).collect(),
        })
    }

    /// Assemble a dataset whose label columns are already in place.
    pub(crate) fn from_parts(
        frame: DataFrame,
        feature_names: Vec<String>,
        label_names: Vec<String>,
        label_ids: Vec<LabelId>,
    ) -> Self {
        Self {
            frame,
            feature_names,
            label_names,
            label_ids,
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn num_instances(&self) -> usize {
        self.frame.height()
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn num_labels(&self) -> usize {
        self.label_ids.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Original identifiers of the label columns, in column order
    pub fn label_ids(&self) -> &[LabelId] {
        &self.label_ids
    }

    /// Column position of a label identifier
    pub fn label_position(&self, id: LabelId) -> Option<usize> {
        self.label_ids.iter().position(|&l| l == id)
    }

    pub fn instance(&self, index: usize) -> Result<Instance> {
        if index >= self.num_instances() {
            return Err(EnsembleError::Dataset(format!(
                "Instance {} out of range ({} instances)",
                index,
                self.num_instances()
            )));
        }

        let mut features = Vec::with_capacity(self.num_features());
        for name in &self.feature_names {
            let value = self.frame.column(name)?.f64()?.get(index).ok_or_else(|| {
                EnsembleError::Dataset(format!("Null feature {} at row {}", name, index))
            })?;
            features.push(value);
        }

        let mut labels = Vec::with_capacity(self.num_labels());
        for name in &self.label_names {
            labels.push(self.frame.column(name)?.bool()?.get(index).unwrap_or(false));
        }

        Ok(Instance::new(features, labels))
    }

    /// Materialize all rows, reading each column once.
    pub fn instances(&self) -> Result<Vec<Instance>> {
        let n = self.num_instances();
        let mut rows: Vec<Instance> = (0..n)
            .map(|_| Instance::new(Vec::with_capacity(self.num_features()), Vec::with_capacity(self.num_labels())))
            .collect();

        for name in &self.feature_names {
            let values = self.frame.column(name)?.f64()?;
            for (i, value) in values.into_iter().enumerate() {
                let value = value.ok_or_else(|| {
                    EnsembleError::Dataset(format!("Null feature {} at row {}", name, i))
                })?;
                rows[i].features.push(value);
            }
        }
        for name in &self.label_names {
            let values = self.frame.column(name)?.bool()?;
            for (i, value) in values.into_iter().enumerate() {
                rows[i].labels.push(value.unwrap_or(false));
            }
        }

        Ok(rows)
    }

    /// Rows at `indices`, in that order; repeated indices repeat rows.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Self> {
        let n = self.num_instances();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(EnsembleError::Dataset(format!(
                "Row index {} out of range ({} instances)",
                bad, n
            )));
        }
        let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
        let idx = IdxCa::from_vec("idx".into(), idx);

        Ok(Self {
            frame: self.frame.take(&idx)?,
            feature_names: self.feature_names.clone(),
            label_names: self.label_names.clone(),
            label_ids: self.label_ids.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> MultiLabelDataset {
        MultiLabelDataset::from_rows(
            vec![vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]],
            vec![vec![true, false], vec![false, true], vec![true, true]],
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows_shape() {
        let data = small();
        assert_eq!(data.num_instances(), 3);
        assert_eq!(data.num_features(), 2);
        assert_eq!(data.num_labels(), 2);
        assert_eq!(data.label_ids(), &[0, 1]);
        assert_eq!(data.label_names(), &["label_0".to_string(), "label_1".to_string()]);
    }

    #[test]
    fn test_instance_access_matches_bulk_access() {
        let data = small();
        let all = data.instances().unwrap();
        for (i, row) in all.iter().enumerate() {
            assert_eq!(&data.instance(i).unwrap(), row);
        }
        assert_eq!(all[1].features, vec![2.0, 3.0]);
        assert_eq!(all[1].labels, vec![false, true]);
        assert!(data.instance(3).is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = MultiLabelDataset::from_rows(
            vec![vec![0.0, 1.0], vec![2.0]],
            vec![vec![true], vec![false]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_take_rows_repeats_and_orders() {
        let data = small();
        let sampled = data.take_rows(&[2, 0, 2]).unwrap();
        let rows = sampled.instances().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].features, vec![4.0, 5.0]);
        assert_eq!(rows[1].features, vec![0.0, 1.0]);
        assert_eq!(rows[2], rows[0]);
        assert!(data.take_rows(&[5]).is_err());
    }

    #[test]
    fn test_from_frame_casts_columns() {
        let df = DataFrame::new(vec![
            Column::new("x".into(), vec![1i64, 2, 3]),
            Column::new("y".into(), vec![0i64, 1, 1]),
            Column::new("z".into(), vec![0.5f64, 1.5, 2.5]),
        ])
        .unwrap();

        let data = MultiLabelDataset::from_frame(df, &["y".to_string()]).unwrap();
        assert_eq!(data.feature_names(), &["x".to_string(), "z".to_string()]);
        assert_eq!(data.num_labels(), 1);
        let row = data.instance(1).unwrap();
        assert_eq!(row.features, vec![2.0, 1.5]);
        assert_eq!(row.labels, vec![true]);
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for one-hot encoding
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Found unknown category '{value}' in column '{column}' during transform")]
    UnknownCategory { column: String, value: String },
    #[error("Expected {expected} categorical values, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("Cannot fit an encoder on zero rows")]
    Empty,
}

/// Categories learned for one input column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoricalColumn {
    pub name: String,
    /// Sorted distinct values seen at fit time
    pub categories: Vec<String>,
}

/// One-hot encoder over a fixed list of categorical columns
///
/// Unknown values are rejected at transform time; there is no fallback
/// bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OneHotEncoder {
    columns: Vec<CategoricalColumn>,
}

impl OneHotEncoder {
    /// Learns the sorted category set of every column
    pub fn fit<'v, R>(column_names: &[&str], rows: &[R]) -> Result<Self, EncodeError>
    where
        R: AsRef<[&'v str]>,
    {
        if rows.is_empty() {
            return Err(EncodeError::Empty);
        }

        let mut seen: Vec<BTreeSet<String>> = vec![BTreeSet::new(); column_names.len()];
        for row in rows {
            let values = row.as_ref();
            if values.len() != column_names.len() {
                return Err(EncodeError::WidthMismatch {
                    expected: column_names.len(),
                    actual: values.len(),
                });
            }
            for (set, value) in seen.iter_mut().zip(values) {
                set.insert(value.to_string());
            }
        }

        let columns = column_names
            .iter()
            .zip(seen)
            .map(|(name, categories)| CategoricalColumn {
                name: name.to_string(),
                categories: categories.into_iter().collect(),
            })
            .collect();

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[CategoricalColumn] {
        &self.columns
    }

    /// Width of the encoded vector
    pub fn n_features(&self) -> usize {
        self.columns.iter().map(|c| c.categories.len()).sum()
    }

    /// Output feature names, `column_value`
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| {
                c.categories
                    .iter()
                    .map(move |category| format!("{}_{}", c.name, category))
            })
            .collect()
    }

    /// Encodes one row of categorical values into indicator features
    pub fn transform<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<f64>, EncodeError> {
        if values.len() != self.columns.len() {
            return Err(EncodeError::WidthMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        let mut encoded = vec![0.0; self.n_features()];
        let mut offset = 0;
        for (column, value) in self.columns.iter().zip(values) {
            let value = value.as_ref();
            let position = column
                .categories
                .binary_search_by(|c| c.as_str().cmp(value))
                .map_err(|_| EncodeError::UnknownCategory {
                    column: column.name.clone(),
                    value: value.to_string(),
                })?;
            encoded[offset + position] = 1.0;
            offset += column.categories.len();
        }

        Ok(encoded)
    }
}

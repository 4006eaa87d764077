//! Learning primitives: categorical encoding, random forests and held-out evaluation.

mod encoder;
mod evaluation;
mod forest;

use thiserror::Error;

pub use encoder::{CategoricalColumn, EncodeError, OneHotEncoder};
pub use evaluation::{accuracy, r2_score, train_test_split, Holdout, RowSet};
pub use forest::{ForestParams, RandomForestClassifier, RandomForestRegressor};

/// Error types for model fitting and inference
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot fit on an empty feature matrix")]
    EmptyDataset,

    #[error("Feature matrix has {rows} rows but {targets} targets")]
    TargetLengthMismatch { rows: usize, targets: usize },

    #[error("Expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("A forest needs at least one estimator")]
    NoEstimators,

    #[error("Invalid forest parameters: {0}")]
    InvalidParams(String),

    #[error("Regression target contains non-finite values")]
    NonFiniteTarget,

    #[error("Invalid train/test split: {0}")]
    InvalidSplit(String),

    #[error("Classifier predicted unknown class index {0}")]
    UnknownClass(u32),

    #[error("Forest error: {0}")]
    Forest(#[from] smartcore::error::Failed),

    #[error("Metric error: {0}")]
    Metric(#[from] linfa::Error),
}

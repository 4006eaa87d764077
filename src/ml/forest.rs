use std::collections::BTreeSet;
use std::fmt;

use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier as ForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor as ForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::ModelError;

type ClassForest = ForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;
type ValueForest = ForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Ensemble settings shared by the classifier and the regressor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub seed: u64,
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ForestParams {
    fn n_trees(&self) -> Result<u16, ModelError> {
        match u16::try_from(self.n_estimators) {
            Ok(0) => Err(ModelError::NoEstimators),
            Ok(n) => Ok(n),
            Err(_) => Err(ModelError::InvalidParams(format!(
                "at most {} trees are supported, got {}",
                u16::MAX,
                self.n_estimators
            ))),
        }
    }

    /// Considers `sqrt(n_features)` features per split
    fn classifier(&self) -> Result<RandomForestClassifierParameters, ModelError> {
        let mut params = RandomForestClassifierParameters::default()
            .with_n_trees(self.n_trees()?)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_seed(self.seed);
        if let Some(depth) = self.max_depth {
            params = params.with_max_depth(depth);
        }
        Ok(params)
    }

    /// Considers every feature at each split
    fn regressor(&self, n_features: usize) -> Result<RandomForestRegressorParameters, ModelError> {
        let mut params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees()?.into())
            .with_m(n_features)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_seed(self.seed);
        if let Some(depth) = self.max_depth {
            params = params.with_max_depth(depth);
        }
        Ok(params)
    }
}

fn dense(x: ArrayView2<'_, f64>) -> DenseMatrix<f64> {
    let rows: Vec<Vec<f64>> = x.outer_iter().map(|row| row.to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows)
}

fn check_fit_input(x: &ArrayView2<'_, f64>, n_targets: usize) -> Result<(), ModelError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ModelError::EmptyDataset);
    }
    if x.nrows() != n_targets {
        return Err(ModelError::TargetLengthMismatch {
            rows: x.nrows(),
            targets: n_targets,
        });
    }
    Ok(())
}

fn check_width(expected: usize, x: &ArrayView2<'_, f64>) -> Result<(), ModelError> {
    if x.ncols() != expected {
        return Err(ModelError::FeatureMismatch {
            expected,
            actual: x.ncols(),
        });
    }
    Ok(())
}

/// Random forest over string labels
///
/// Labels are fitted as indices into the sorted class list and mapped back
/// on prediction.
#[derive(Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    classes: Vec<String>,
    n_features: usize,
    forest: ClassForest,
}

impl fmt::Debug for RandomForestClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForestClassifier")
            .field("params", &self.params)
            .field("classes", &self.classes)
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl RandomForestClassifier {
    pub fn fit<S: AsRef<str>>(
        x: ArrayView2<'_, f64>,
        y: &[S],
        params: ForestParams,
    ) -> Result<Self, ModelError> {
        check_fit_input(&x, y.len())?;

        let classes: Vec<String> = y
            .iter()
            .map(|label| label.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let targets: Vec<u32> = y
            .iter()
            .map(|label| {
                classes
                    .binary_search_by(|c| c.as_str().cmp(label.as_ref()))
                    .map(|index| index as u32)
                    .unwrap_or_default()
            })
            .collect();

        let forest = ClassForest::fit(&dense(x), &targets, params.classifier()?)?;

        tracing::debug!(
            trees = params.n_estimators,
            classes = classes.len(),
            features = x.ncols(),
            "Fitted random forest classifier"
        );

        Ok(Self {
            params,
            classes,
            n_features: x.ncols(),
            forest,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_estimators(&self) -> usize {
        self.params.n_estimators
    }

    fn label(&self, index: u32) -> Result<&str, ModelError> {
        self.classes
            .get(index as usize)
            .map(String::as_str)
            .ok_or(ModelError::UnknownClass(index))
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<&str, ModelError> {
        let x = row.insert_axis(Axis(0));
        check_width(self.n_features, &x)?;
        let predicted = self.forest.predict(&dense(x))?;
        match predicted.first() {
            Some(index) => self.label(*index),
            None => Err(ModelError::EmptyDataset),
        }
    }

    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<String>, ModelError> {
        check_width(self.n_features, &x)?;
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }
        self.forest
            .predict(&dense(x))?
            .into_iter()
            .map(|index| self.label(index).map(str::to_string))
            .collect()
    }
}

/// Random forest regressor averaging the predictions of every tree
#[derive(Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestParams,
    n_features: usize,
    forest: ValueForest,
}

impl fmt::Debug for RandomForestRegressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForestRegressor")
            .field("params", &self.params)
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl RandomForestRegressor {
    pub fn fit(x: ArrayView2<'_, f64>, y: &[f64], params: ForestParams) -> Result<Self, ModelError> {
        check_fit_input(&x, y.len())?;
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteTarget);
        }

        let forest = ValueForest::fit(&dense(x), &y.to_vec(), params.regressor(x.ncols())?)?;

        tracing::debug!(
            trees = params.n_estimators,
            features = x.ncols(),
            "Fitted random forest regressor"
        );

        Ok(Self {
            params,
            n_features: x.ncols(),
            forest,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_estimators(&self) -> usize {
        self.params.n_estimators
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        let predicted = self.predict(row.insert_axis(Axis(0)))?;
        predicted.first().copied().ok_or(ModelError::EmptyDataset)
    }

    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>, ModelError> {
        check_width(self.n_features, &x)?;
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }
        Ok(self.forest.predict(&dense(x))?)
    }
}

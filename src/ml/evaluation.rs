use linfa::prelude::*;
use linfa::{Dataset, DatasetBase};
use ndarray::{Array1, Array2, Ix1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::ModelError;

/// Feature rows of one side of a split, targets are the source row indices
pub type RowSet = Dataset<f64, usize, Ix1>;

/// Both sides of a shuffled train/test split
pub struct Holdout {
    pub train: RowSet,
    pub test: RowSet,
}

impl Holdout {
    pub fn train_rows(&self) -> Vec<usize> {
        self.train.targets().to_vec()
    }

    pub fn test_rows(&self) -> Vec<usize> {
        self.test.targets().to_vec()
    }
}

/// Shuffles the rows with a seeded RNG and holds out `test_fraction` of them.
///
/// The train side gets `ceil(n * (1 - test_fraction))` rows; both sides must
/// end up non-empty.
pub fn train_test_split(
    records: Array2<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<Holdout, ModelError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InvalidSplit(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let n_rows = records.nrows();
    let ratio = (1.0 - test_fraction) as f32;
    let n_train = (n_rows as f32 * ratio).ceil() as usize;
    if n_train == 0 || n_train >= n_rows {
        return Err(ModelError::InvalidSplit(format!(
            "{} rows cannot be split with test fraction {}",
            n_rows, test_fraction
        )));
    }

    let dataset = DatasetBase::new(records, Array1::from_iter(0..n_rows));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (train, test) = dataset.shuffle(&mut rng).split_with_ratio(ratio);
    Ok(Holdout { train, test })
}

/// Fraction of labels predicted exactly
pub fn accuracy(predicted: &[String], truth: &[String]) -> Result<f64, ModelError> {
    let predicted = Array1::from(predicted.to_vec());
    let truth = Array1::from(truth.to_vec());
    let confusion = predicted.confusion_matrix(truth.view())?;
    Ok(confusion.accuracy() as f64)
}

/// Coefficient of determination
pub fn r2_score(predicted: &[f64], truth: &[f64]) -> Result<f64, ModelError> {
    let predicted = Array1::from(predicted.to_vec());
    let truth = Array1::from(truth.to_vec());
    Ok(predicted.r2(&truth)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rows(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64)
    }

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(rows(500), 0.2, 42).unwrap();
        assert_eq!(split.train_rows().len(), 400);
        assert_eq!(split.test_rows().len(), 100);
        assert_eq!(split.train.records().nrows(), 400);
    }

    #[test]
    fn test_split_partitions_every_row_once() {
        let split = train_test_split(rows(50), 0.2, 7).unwrap();
        let mut all = split.train_rows();
        all.extend(split.test_rows());
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());

        let train: HashSet<usize> = split.train_rows().into_iter().collect();
        assert!(split.test_rows().iter().all(|i| !train.contains(i)));
    }

    #[test]
    fn test_records_follow_their_row_index() {
        let split = train_test_split(rows(30), 0.2, 3).unwrap();
        for (record, row) in split.test.records().outer_iter().zip(split.test_rows()) {
            assert_eq!(record[0], (row * 2) as f64);
        }
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = train_test_split(rows(100), 0.2, 42).unwrap();
        let b = train_test_split(rows(100), 0.2, 42).unwrap();
        let c = train_test_split(rows(100), 0.2, 43).unwrap();
        assert_eq!(a.test_rows(), b.test_rows());
        assert_ne!(a.test_rows(), c.test_rows());
    }

    #[test]
    fn test_rejects_degenerate_splits() {
        assert!(train_test_split(rows(1), 0.2, 42).is_err());
        assert!(train_test_split(rows(0), 0.2, 42).is_err());
        assert!(train_test_split(rows(10), 1.0, 42).is_err());
        assert!(train_test_split(rows(10), 0.0, 42).is_err());
    }

    #[test]
    fn test_accuracy() {
        let labels = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let truth = labels(&["Jett", "Sage", "Omen", "Sova"]);
        let predicted = labels(&["Jett", "Sage", "Viper", "Sova"]);
        assert!((accuracy(&predicted, &truth).unwrap() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_r2_perfect_and_mean_predictions() {
        let truth = [0.3, 0.4, 0.5];
        assert!((r2_score(&truth, &truth).unwrap() - 1.0).abs() < 1e-9);
        assert!(r2_score(&[0.4, 0.4, 0.4], &truth).unwrap().abs() < 1e-6);
    }
}

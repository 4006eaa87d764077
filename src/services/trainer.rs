use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ml::{
    accuracy, r2_score, train_test_split, EncodeError, ForestParams, ModelError,
    RandomForestClassifier, RandomForestRegressor,
};
use crate::models::PlayerProfile;

use super::artifacts::{ArtifactError, ArtifactStore, ModelArtifacts};
use super::dataset::{DatasetError, PlayerRecord};
use super::features::{feature_matrix, fit_encoder};

/// Error types for the training pipeline
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("{metric} {value:.4} is below the required minimum {threshold:.4}")]
    QualityGate {
        metric: &'static str,
        value: f64,
        threshold: f64,
    },
}

/// Optional minimum scores a fit must reach before it is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityGate {
    pub min_accuracy: Option<f64>,
    pub min_r2: Option<f64>,
}

impl QualityGate {
    pub fn check(&self, report: &TrainingReport) -> Result<(), TrainingError> {
        if let Some(threshold) = self.min_accuracy {
            if report.agent_accuracy < threshold {
                return Err(TrainingError::QualityGate {
                    metric: "agent accuracy",
                    value: report.agent_accuracy,
                    threshold,
                });
            }
        }
        if let Some(threshold) = self.min_r2 {
            if report.sens_r2 < threshold {
                return Err(TrainingError::QualityGate {
                    metric: "sensitivity R²",
                    value: report.sens_r2,
                    threshold,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    pub forest: ForestParams,
    pub test_fraction: f64,
    pub split_seed: u64,
    pub quality_gate: QualityGate,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            forest: ForestParams::default(),
            test_fraction: 0.2,
            split_seed: 42,
            quality_gate: QualityGate::default(),
        }
    }
}

/// Diagnostics of one training run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub n_features: usize,
    pub n_agents: usize,
    pub n_estimators: usize,
    pub seed: u64,
    /// Classifier accuracy on the held-out rows
    pub agent_accuracy: f64,
    /// Regressor R² on the held-out rows
    pub sens_r2: f64,
}

#[derive(Debug)]
pub struct TrainedModels {
    pub artifacts: ModelArtifacts,
    pub report: TrainingReport,
}

/// Fits the encoder and both forests, then scores them on the held-out split.
///
/// Scores are diagnostics; they only fail the run when the quality gate
/// sets a threshold.
pub fn train(records: &[PlayerRecord], options: &TrainingOptions) -> Result<TrainedModels, TrainingError> {
    if records.is_empty() {
        return Err(DatasetError::Empty.into());
    }
    let start = Instant::now();

    let profiles: Vec<PlayerProfile> = records.iter().map(PlayerRecord::profile).collect();
    let agents: Vec<&str> = records
        .iter()
        .map(|r| r.recommended_agent.as_str())
        .collect();
    let sens: Vec<f64> = records.iter().map(|r| r.sens_800).collect();

    let encoder = fit_encoder(&profiles)?;
    let x = feature_matrix(&encoder, &profiles)?;
    let n_features = x.ncols();

    let split = train_test_split(x, options.test_fraction, options.split_seed)?;
    let train_rows = split.train_rows();
    let test_rows = split.test_rows();
    let pick_agents = |rows: &[usize]| {
        rows.iter()
            .map(|&i| agents[i].to_string())
            .collect::<Vec<_>>()
    };
    let pick_sens = |rows: &[usize]| rows.iter().map(|&i| sens[i]).collect::<Vec<_>>();

    tracing::info!(
        rows = records.len(),
        train_rows = train_rows.len(),
        test_rows = test_rows.len(),
        features = n_features,
        "Training on synthetic dataset"
    );

    let x_train = split.train.records().view();
    let x_test = split.test.records().view();

    let classifier =
        RandomForestClassifier::fit(x_train, &pick_agents(&train_rows), options.forest)?;
    let agent_accuracy = accuracy(&classifier.predict(x_test)?, &pick_agents(&test_rows))?;
    tracing::info!(accuracy = %format!("{:.2}%", agent_accuracy * 100.0), "Agent prediction accuracy");

    let regressor = RandomForestRegressor::fit(x_train, &pick_sens(&train_rows), options.forest)?;
    let sens_r2 = r2_score(&regressor.predict(x_test)?, &pick_sens(&test_rows))?;
    tracing::info!(r2 = %format!("{:.4}", sens_r2), "Sensitivity prediction R²");

    let report = TrainingReport {
        trained_at: Utc::now(),
        rows: records.len(),
        train_rows: train_rows.len(),
        test_rows: test_rows.len(),
        n_features,
        n_agents: classifier.classes().len(),
        n_estimators: options.forest.n_estimators,
        seed: options.forest.seed,
        agent_accuracy,
        sens_r2,
    };
    options.quality_gate.check(&report)?;

    tracing::info!(
        processing_time_ms = start.elapsed().as_millis(),
        "Training completed"
    );

    Ok(TrainedModels {
        artifacts: ModelArtifacts {
            encoder,
            classifier,
            regressor,
        },
        report,
    })
}

/// Trains and persists the artifacts plus the training report
pub fn train_and_save(
    records: &[PlayerRecord],
    options: &TrainingOptions,
    store: &ArtifactStore,
) -> Result<TrainingReport, TrainingError> {
    let trained = train(records, options)?;
    store.save(&trained.artifacts)?;
    store.save_report(&trained.report)?;
    Ok(trained.report)
}

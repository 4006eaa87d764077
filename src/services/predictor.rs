use thiserror::Error;

use crate::models::{PlayerProfile, Prediction};

use super::artifacts::{ArtifactStore, ModelArtifacts};
use super::features::feature_row;

/// Error types for a single recommendation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredictionError {
    /// Artifacts failed to load at startup; every request fails the same way
    #[error("Models not loaded. Please train the model first. ({0})")]
    ModelNotTrained(String),

    /// Feature encoding or model evaluation failed for this request
    #[error("{0}")]
    Inference(String),
}

/// Produces a recommendation for a validated profile
///
/// The HTTP layer depends on this trait rather than on [`Predictor`], so
/// handlers can be exercised with stand-in implementations.
pub trait Recommender: Send + Sync {
    fn recommend(&self, profile: &PlayerProfile) -> Result<Prediction, PredictionError>;
}

/// Immutable model context built once at startup
#[derive(Debug)]
pub enum Predictor {
    Ready(Box<ModelArtifacts>),
    NotTrained { reason: String },
}

impl Predictor {
    /// Loads artifacts from `store`, falling back to the not-trained state on any failure
    pub fn load(store: &ArtifactStore) -> Self {
        match store.load() {
            Ok(artifacts) => {
                tracing::info!(
                    dir = %store.dir().display(),
                    agents = artifacts.classifier.classes().len(),
                    trees = artifacts.classifier.n_estimators(),
                    "Models loaded successfully"
                );
                Self::Ready(Box::new(artifacts))
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading models");
                Self::NotTrained {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        Self::Ready(Box::new(artifacts))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

fn infer(models: &ModelArtifacts, profile: &PlayerProfile) -> Result<Prediction, PredictionError> {
    let row = feature_row(&models.encoder, profile)
        .map_err(|e| PredictionError::Inference(e.to_string()))?;
    let agent = models
        .classifier
        .predict_row(row.view())
        .map_err(|e| PredictionError::Inference(e.to_string()))?;
    let sens_800 = models
        .regressor
        .predict_row(row.view())
        .map_err(|e| PredictionError::Inference(e.to_string()))?;

    if !sens_800.is_finite() || sens_800 <= 0.0 {
        return Err(PredictionError::Inference(format!(
            "regressor produced an invalid sensitivity: {}",
            sens_800
        )));
    }

    Ok(Prediction::from_raw(agent, sens_800))
}

impl Recommender for Predictor {
    fn recommend(&self, profile: &PlayerProfile) -> Result<Prediction, PredictionError> {
        match self {
            Self::Ready(models) => infer(models, profile),
            Self::NotTrained { reason } => Err(PredictionError::ModelNotTrained(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{ForestParams, OneHotEncoder};
    use crate::models::{AimType, MapName, Playstyle, Role};
    use crate::services::dataset::DatasetGenerator;
    use crate::services::trainer::{train, TrainingOptions};

    fn example_profile() -> PlayerProfile {
        PlayerProfile {
            playstyle: Playstyle::Aggressive,
            preferred_role: Role::Duelist,
            favorite_map: MapName::Ascent,
            aim_type: AimType::Precise,
            edpi: 320,
            ability_usage: 5,
            aggressiveness: 7,
            hours_played: 200,
        }
    }

    fn trained() -> ModelArtifacts {
        let records = DatasetGenerator::seeded(42).generate(300).unwrap();
        let options = TrainingOptions {
            forest: ForestParams {
                n_estimators: 10,
                ..ForestParams::default()
            },
            ..TrainingOptions::default()
        };
        train(&records, &options).unwrap().artifacts
    }

    #[test]
    fn test_ready_predictor_recommends() {
        let predictor = Predictor::from_artifacts(trained());
        assert!(predictor.is_ready());

        let prediction = predictor.recommend(&example_profile()).unwrap();
        assert!(!prediction.recommended_agent.is_empty());
        assert!(prediction.recommended_sens_800 > 0.0 && prediction.recommended_sens_800 < 1.0);
        assert_eq!(
            prediction.edpi,
            (prediction.recommended_sens_800 * 800.0).round() as i64
        );
    }

    #[test]
    fn test_not_trained_fails_every_call() {
        let predictor = Predictor::NotTrained {
            reason: "Artifact not found: models/encoder.json".to_string(),
        };
        assert!(!predictor.is_ready());

        for _ in 0..2 {
            let err = predictor.recommend(&example_profile()).unwrap_err();
            assert!(matches!(err, PredictionError::ModelNotTrained(_)));
            assert!(err.to_string().contains("encoder.json"));
        }
    }

    #[test]
    fn test_load_from_empty_dir_is_not_trained() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Predictor::load(&ArtifactStore::new(dir.path()));
        assert!(!predictor.is_ready());
    }

    #[test]
    fn test_unseen_category_is_an_inference_error() {
        let mut models = trained();
        let rows = vec![["aggressive", "duelist", "Bind", "precise"]];
        models.encoder = OneHotEncoder::fit(&crate::models::CATEGORICAL_COLUMNS, &rows).unwrap();

        let err = Predictor::from_artifacts(models)
            .recommend(&example_profile())
            .unwrap_err();
        match err {
            PredictionError::Inference(message) => assert!(message.contains("Ascent")),
            other => panic!("unexpected error {:?}", other),
        }
    }
}

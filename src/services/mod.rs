pub mod artifacts;
pub mod dataset;
pub mod features;
pub mod predictor;
pub mod trainer;

pub use artifacts::{ArtifactError, ArtifactStore, ModelArtifacts};
pub use dataset::{DatasetError, DatasetGenerator, PlayerRecord};
pub use predictor::{PredictionError, Predictor, Recommender};
pub use trainer::{train, train_and_save, QualityGate, TrainingError, TrainingOptions, TrainingReport};

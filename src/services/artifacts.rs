use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::ml::{OneHotEncoder, RandomForestClassifier, RandomForestRegressor};

use super::features::feature_width;
use super::trainer::TrainingReport;

pub const ENCODER_FILE: &str = "encoder.json";
pub const CLASSIFIER_FILE: &str = "agent_model.json";
pub const REGRESSOR_FILE: &str = "sens_model.json";
pub const REPORT_FILE: &str = "training_report.json";

/// Error types for persisted model artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Corrupt artifact {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Inconsistent artifacts: {0}")]
    Inconsistent(String),
}

/// The three fitted objects inference needs
#[derive(Debug)]
pub struct ModelArtifacts {
    pub encoder: OneHotEncoder,
    pub classifier: RandomForestClassifier,
    pub regressor: RandomForestRegressor,
}

impl ModelArtifacts {
    /// Checks that both models were fitted on the encoder's feature layout
    pub fn check_consistency(&self) -> Result<(), ArtifactError> {
        let width = feature_width(&self.encoder);
        if self.classifier.n_features() != width {
            return Err(ArtifactError::Inconsistent(format!(
                "classifier expects {} features, encoder produces {}",
                self.classifier.n_features(),
                width
            )));
        }
        if self.regressor.n_features() != width {
            return Err(ArtifactError::Inconsistent(format!(
                "regressor expects {} features, encoder produces {}",
                self.regressor.n_features(),
                width
            )));
        }
        Ok(())
    }
}

/// Directory holding the serialized encoder, classifier and regressor
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.dir.join(ENCODER_FILE)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.dir.join(CLASSIFIER_FILE)
    }

    pub fn regressor_path(&self) -> PathBuf {
        self.dir.join(REGRESSOR_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    /// Writes all three artifacts, creating the directory if needed
    pub fn save(&self, artifacts: &ModelArtifacts) -> Result<(), ArtifactError> {
        fs::create_dir_all(&self.dir).map_err(|source| ArtifactError::Io {
            path: self.dir.clone(),
            source,
        })?;

        write_json(&self.encoder_path(), &artifacts.encoder)?;
        write_json(&self.classifier_path(), &artifacts.classifier)?;
        write_json(&self.regressor_path(), &artifacts.regressor)?;

        tracing::info!(dir = %self.dir.display(), "Model artifacts saved");
        Ok(())
    }

    pub fn save_report(&self, report: &TrainingReport) -> Result<(), ArtifactError> {
        write_json(&self.report_path(), report)
    }

    /// Reads all three artifacts; any missing or unreadable file fails the load
    pub fn load(&self) -> Result<ModelArtifacts, ArtifactError> {
        let artifacts = ModelArtifacts {
            encoder: read_json(&self.encoder_path())?,
            classifier: read_json(&self.classifier_path())?,
            regressor: read_json(&self.regressor_path())?,
        };
        artifacts.check_consistency()?;
        Ok(artifacts)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let file = File::create(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ArtifactError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::SchemaError;
use super::model::{FittedModel, PremiumModel, RegressionModel};
use super::scaler::StandardScaler;
use super::schema::{FeatureSchema, CONTINUOUS_FEATURES, TRAINED_COLUMNS};
use crate::config::ArtifactConfig;

/// Persisted model: training-time column order plus fitted parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub feature_names: Vec<String>,
    pub model: RegressionModel,
}

/// Persisted standardization fitted on the continuous features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub version: String,
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Everything a prediction needs, loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct ArtifactBundle<M = FittedModel> {
    schema: FeatureSchema,
    scaler: StandardScaler,
    model: M,
    model_version: String,
    scaler_version: String,
    loaded_at: DateTime<Utc>,
}

impl ArtifactBundle<FittedModel> {
    /// Read and cross-check the model and scaler artifacts named in the configuration.
    pub fn load(config: &ArtifactConfig) -> Result<Self, ArtifactError> {
        let model: ModelArtifact = read_json(&config.model_path)?;
        let scaler: ScalerArtifact = read_json(&config.scaler_path)?;

        let bundle = Self::from_artifacts(model, scaler)?;
        info!(
            model_version = %bundle.model_version,
            scaler_version = %bundle.scaler_version,
            model_kind = bundle.model.model().kind(),
            columns = bundle.schema.len(),
            "loaded model artifacts"
        );
        Ok(bundle)
    }

    pub fn from_artifacts(
        model: ModelArtifact,
        scaler: ScalerArtifact,
    ) -> Result<Self, SchemaError> {
        let schema = FeatureSchema::new(model.feature_names, CONTINUOUS_FEATURES)?;
        let fitted = FittedModel::new(model.model, schema.len())?;
        let standard = StandardScaler::new(scaler.feature_names, scaler.mean, scaler.scale)?;

        Self::assemble(schema, standard, fitted, model.version, scaler.version)
    }
}

impl<M: PremiumModel> ArtifactBundle<M> {
    /// Cross-check the pieces and freeze them into a bundle.
    pub fn assemble(
        schema: FeatureSchema,
        scaler: StandardScaler,
        model: M,
        model_version: impl Into<String>,
        scaler_version: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        scaler.check_schema(&schema)?;
        if model.input_width() != schema.len() {
            return Err(SchemaError::ModelWidth {
                model: model.input_width(),
                schema: schema.len(),
            });
        }

        let unfilled: Vec<&str> = schema
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|column| !TRAINED_COLUMNS.contains(column))
            .collect();
        if !unfilled.is_empty() {
            warn!(
                columns = ?unfilled,
                "model expects columns the feature deriver never produces; they will be zero-filled"
            );
        }

        Ok(Self {
            schema,
            scaler,
            model,
            model_version: model_version.into(),
            scaler_version: scaler_version.into(),
            loaded_at: Utc::now(),
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn scaler_version(&self) -> &str {
        &self.scaler_version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Startup failure while reading or cross-checking artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to open artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("artifact metadata mismatch: {0}")]
    Schema(#[from] SchemaError),
}

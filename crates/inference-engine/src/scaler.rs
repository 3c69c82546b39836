//! Feature Scaling

use crate::artifact::{check_feature_names, parse_json, per_feature, read_json};
use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Normalization fit on the training data, applied before classification
pub trait Scaler: Send + Sync {
    /// Map raw feature rows to normalized rows of the same shape
    fn transform(&self, rows: &[FeatureVector]) -> Result<Vec<FeatureVector>, InferenceError>;
}

/// Persisted form of a fitted standard scaler
#[derive(Debug, Deserialize)]
struct StandardScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

/// Z-score scaler with per-column mean and scale learned at fit time
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_DIMENSION],
    scale: [f64; FEATURE_DIMENSION],
}

impl StandardScaler {
    /// Create a scaler from fitted statistics.
    ///
    /// Scales must be non-zero; a constant training column is stored with a
    /// scale of 1 by the fitting side.
    pub fn new(
        mean: [f64; FEATURE_DIMENSION],
        scale: [f64; FEATURE_DIMENSION],
    ) -> Result<Self, InferenceError> {
        if let Some(i) = scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(InferenceError::ModelLoadError(format!(
                "scale for column {} must be finite and non-zero, got {}",
                i, scale[i]
            )));
        }
        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(InferenceError::ModelLoadError(format!(
                "mean for column {} is not finite",
                i
            )));
        }
        Ok(Self { mean, scale })
    }

    /// Pass-through scaler
    pub fn identity() -> Self {
        Self {
            mean: [0.0; FEATURE_DIMENSION],
            scale: [1.0; FEATURE_DIMENSION],
        }
    }

    /// Parse a scaler artifact from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, InferenceError> {
        Self::from_artifact(parse_json(text)?)
    }

    /// Load a scaler artifact from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let scaler = Self::from_artifact(read_json(path)?)?;
        info!("Loaded standard scaler from {}", path.display());
        Ok(scaler)
    }

    fn from_artifact(artifact: StandardScalerArtifact) -> Result<Self, InferenceError> {
        check_feature_names(artifact.feature_names.as_deref())?;
        Self::new(
            per_feature("mean", artifact.mean)?,
            per_feature("scale", artifact.scale)?,
        )
    }

    pub fn mean(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.scale
    }

    fn transform_row(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = *row.values();
        for ((x, mean), scale) in out.iter_mut().zip(&self.mean).zip(&self.scale) {
            *x = (*x - mean) / scale;
        }
        FeatureVector::new(out)
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, rows: &[FeatureVector]) -> Result<Vec<FeatureVector>, InferenceError> {
        Ok(rows.iter().map(|row| self.transform_row(row)).collect())
    }
}

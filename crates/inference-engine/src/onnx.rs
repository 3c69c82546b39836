//! ONNX Classifier backed by tract
//!
//! Expects a binary classifier exported with a single `float32[1, 14]`
//! input and two outputs: the predicted label (`int64`) and the class
//! probabilities (`float32[1, 2]`). Exporters that wrap probabilities in a
//! ZipMap must have it disabled.

use crate::classifier::{ClassProbabilities, Classifier, TurnoverClass};
use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, info};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Classifier running an optimized ONNX graph
pub struct OnnxClassifier {
    plan: OnnxPlan,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model for single-row inference
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading ONNX model: {}", path.display());

        let plan = Self::build_plan(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;

        Ok(Self { plan })
    }

    fn build_plan(path: &Path) -> TractResult<OnnxPlan> {
        tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into())?
            .into_optimized()?
            .into_runnable()
    }

    fn run_row(&self, row: &FeatureVector) -> TractResult<(TurnoverClass, ClassProbabilities)> {
        let data: Vec<f32> = row.values().iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, FEATURE_DIMENSION], &data)?;
        let outputs = self.plan.run(tvec!(input.into()))?;
        if outputs.len() < 2 {
            anyhow::bail!("expected label and probability outputs, got {}", outputs.len());
        }

        let labels = outputs[0].cast_to::<i64>()?;
        let label = labels
            .as_slice::<i64>()?
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("empty label output"))?;

        let probabilities = outputs[1].cast_to::<f32>()?;
        let probabilities = probabilities.as_slice::<f32>()?;
        if probabilities.len() != 2 {
            anyhow::bail!("expected 2 class probabilities, got {}", probabilities.len());
        }

        Ok((
            TurnoverClass::from_label(label),
            ClassProbabilities::new(probabilities[0] as f64, probabilities[1] as f64),
        ))
    }

    fn run_rows(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<(TurnoverClass, ClassProbabilities)>, InferenceError> {
        let start = std::time::Instant::now();
        let out = rows
            .iter()
            .map(|row| self.run_row(row))
            .collect::<TractResult<Vec<_>>>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        debug!("ONNX inference over {} rows in {:?}", rows.len(), start.elapsed());
        Ok(out)
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<TurnoverClass>, InferenceError> {
        Ok(self.run_rows(rows)?.into_iter().map(|(class, _)| class).collect())
    }

    fn predict_proba(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<ClassProbabilities>, InferenceError> {
        Ok(self.run_rows(rows)?.into_iter().map(|(_, p)| p).collect())
    }

    // One graph execution yields both outputs
    fn classify(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<(TurnoverClass, ClassProbabilities)>, InferenceError> {
        self.run_rows(rows)
    }
}

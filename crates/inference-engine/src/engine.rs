//! Inference Engine Implementation

use crate::classifier::{load_classifier, ClassProbabilities, Classifier, TurnoverClass};
use crate::scaler::{Scaler, StandardScaler};
use crate::InferenceError;
use feature_engine::{FeatureVector, Payload};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Prediction for one employee
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class
    #[serde(rename = "prediction")]
    pub class: TurnoverClass,
    /// Probabilities for each class
    #[serde(rename = "probability")]
    pub probabilities: ClassProbabilities,
}

/// Scaler and classifier loaded once at startup and shared read-only
pub struct InferenceEngine {
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl InferenceEngine {
    /// Create an engine from already loaded artifacts
    pub fn new(scaler: Box<dyn Scaler>, classifier: Box<dyn Classifier>) -> Self {
        Self { scaler, classifier }
    }

    /// Load both artifacts from disk
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, InferenceError> {
        info!(
            "Creating inference engine: model={}, scaler={}",
            model_path.display(),
            scaler_path.display()
        );
        let scaler = StandardScaler::from_path(scaler_path)?;
        let classifier = load_classifier(model_path)?;
        Ok(Self::new(Box::new(scaler), classifier))
    }

    /// Scale and classify raw feature rows
    pub fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<Prediction>, InferenceError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let start = std::time::Instant::now();

        let scaled = self.scaler.transform(rows)?;
        if scaled.len() != rows.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} scaled rows", rows.len()),
                actual: scaled.len().to_string(),
            });
        }

        let predictions: Vec<Prediction> = self
            .classifier
            .classify(&scaled)?
            .into_iter()
            .map(|(class, probabilities)| Prediction {
                class,
                probabilities,
            })
            .collect();

        debug!(
            "Inference over {} rows with {} classifier in {:?}",
            rows.len(),
            self.classifier.name(),
            start.elapsed()
        );
        Ok(predictions)
    }

    /// Predict while keeping the single/batch shape of the input
    pub fn predict_payload(
        &self,
        features: &Payload<FeatureVector>,
    ) -> Result<Payload<Prediction>, InferenceError> {
        let predictions = self.predict(features.as_slice())?;
        let actual = predictions.len();
        features
            .with_rows(predictions)
            .ok_or_else(|| InferenceError::InvalidInputShape {
                expected: format!("{} predictions", features.len()),
                actual: actual.to_string(),
            })
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LogisticClassifier;
    use feature_engine::{Feature, FEATURE_DIMENSION};

    fn engine() -> InferenceEngine {
        // Centre hours on 200 so long hours push towards turnover
        let mut mean = [0.0; FEATURE_DIMENSION];
        let mut scale = [1.0; FEATURE_DIMENSION];
        mean[Feature::AverageMonthlyHours.index()] = 200.0;
        scale[Feature::AverageMonthlyHours.index()] = 50.0;
        let mut coefficients = [0.0; FEATURE_DIMENSION];
        coefficients[Feature::AverageMonthlyHours.index()] = 2.0;

        InferenceEngine::new(
            Box::new(StandardScaler::new(mean, scale).unwrap()),
            Box::new(LogisticClassifier::new(coefficients, 0.0)),
        )
    }

    fn row(hours: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[Feature::AverageMonthlyHours.index()] = hours;
        FeatureVector::new(values)
    }

    #[test]
    fn test_scaling_applied_before_classification() {
        let predictions = engine().predict(&[row(300.0), row(100.0)]).unwrap();
        assert_eq!(predictions[0].class, TurnoverClass::Turnover);
        assert_eq!(predictions[1].class, TurnoverClass::NoTurnover);
        // z = 2 * (300 - 200) / 50 = 4
        let expected = 1.0 / (1.0 + (-4.0f64).exp());
        assert!((predictions[0].probabilities.turnover - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_batch() {
        assert!(engine().predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_payload_shape_preserved() {
        let engine = engine();
        let single = engine.predict_payload(&Payload::Single(row(250.0))).unwrap();
        assert!(matches!(single, Payload::Single(_)));

        let batch = engine
            .predict_payload(&Payload::Batch(vec![row(250.0), row(150.0)]))
            .unwrap();
        assert!(batch.is_batch());
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_prediction_json_shape() {
        let prediction = engine().predict(&[row(200.0)]).unwrap()[0];
        let json = serde_json::to_value(prediction).unwrap();
        assert_eq!(json["prediction"], "No Turnover");
        assert_eq!(json["probability"]["Turnover"], 0.5);
        assert_eq!(json["probability"]["No Turnover"], 0.5);
    }

    #[test]
    fn test_predictions_are_deterministic() {
        let engine = engine();
        let a = engine.predict(&[row(231.0)]).unwrap();
        let b = engine.predict(&[row(231.0)]).unwrap();
        assert_eq!(a, b);
    }
}

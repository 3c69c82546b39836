//! Classifier Interface and Artifact Loading

use crate::artifact::{check_feature_names, parse_json, per_feature, read_json};
use crate::onnx::OnnxClassifier;
use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Outcome predicted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnoverClass {
    /// Label 0
    #[serde(rename = "No Turnover")]
    NoTurnover,
    /// Label 1
    #[serde(rename = "Turnover")]
    Turnover,
}

impl TurnoverClass {
    /// Map a raw model label; only `1` means the employee leaves
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            TurnoverClass::Turnover
        } else {
            TurnoverClass::NoTurnover
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnoverClass::NoTurnover => "No Turnover",
            TurnoverClass::Turnover => "Turnover",
        }
    }
}

impl fmt::Display for TurnoverClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability distribution over the two classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    #[serde(rename = "No Turnover")]
    pub no_turnover: f64,
    #[serde(rename = "Turnover")]
    pub turnover: f64,
}

impl ClassProbabilities {
    pub fn new(no_turnover: f64, turnover: f64) -> Self {
        Self {
            no_turnover,
            turnover,
        }
    }

    /// Distribution from the probability of the positive class
    pub fn from_turnover(turnover: f64) -> Self {
        Self::new(1.0 - turnover, turnover)
    }
}

/// Binary turnover classifier over scaled feature rows
pub trait Classifier: Send + Sync {
    /// Short description for logs
    fn name(&self) -> &str;

    /// Predicted class per row
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<TurnoverClass>, InferenceError>;

    /// Class distribution per row
    fn predict_proba(&self, rows: &[FeatureVector])
        -> Result<Vec<ClassProbabilities>, InferenceError>;

    /// Class and distribution per row
    fn classify(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<(TurnoverClass, ClassProbabilities)>, InferenceError> {
        let classes = self.predict(rows)?;
        let probabilities = self.predict_proba(rows)?;
        if classes.len() != rows.len() || probabilities.len() != rows.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} predictions", rows.len()),
                actual: format!("{} labels, {} distributions", classes.len(), probabilities.len()),
            });
        }
        Ok(classes.into_iter().zip(probabilities).collect())
    }
}

/// Persisted form of a fitted logistic regression
#[derive(Debug, Deserialize)]
struct LogisticArtifact {
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

/// Logistic regression exported as plain coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticClassifier {
    coefficients: [f64; FEATURE_DIMENSION],
    intercept: f64,
}

impl LogisticClassifier {
    pub fn new(coefficients: [f64; FEATURE_DIMENSION], intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, InferenceError> {
        Self::from_artifact(parse_json(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        Self::from_artifact(read_json(path.as_ref())?)
    }

    fn from_artifact(artifact: LogisticArtifact) -> Result<Self, InferenceError> {
        check_feature_names(artifact.feature_names.as_deref())?;
        if !artifact.intercept.is_finite() {
            return Err(InferenceError::ModelLoadError(
                "intercept is not finite".to_string(),
            ));
        }
        Ok(Self::new(
            per_feature("coefficient", artifact.coefficients)?,
            artifact.intercept,
        ))
    }

    /// Signed distance to the decision boundary
    pub fn decision_function(&self, row: &FeatureVector) -> f64 {
        self.coefficients
            .iter()
            .zip(row.values())
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

impl Classifier for LogisticClassifier {
    fn name(&self) -> &str {
        "logistic"
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<TurnoverClass>, InferenceError> {
        Ok(rows
            .iter()
            .map(|row| TurnoverClass::from_label((self.decision_function(row) > 0.0) as i64))
            .collect())
    }

    fn predict_proba(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<ClassProbabilities>, InferenceError> {
        Ok(rows
            .iter()
            .map(|row| {
                let z = self.decision_function(row);
                ClassProbabilities::from_turnover(1.0 / (1.0 + (-z).exp()))
            })
            .collect())
    }
}

/// Load a classifier artifact, choosing the backend by file extension.
///
/// `.onnx` files run through tract; `.json` files hold logistic
/// regression coefficients.
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Box<dyn Classifier>, InferenceError> {
    let path = path.as_ref();
    let classifier: Box<dyn Classifier> = match path.extension().and_then(|e| e.to_str()) {
        Some("onnx") => Box::new(OnnxClassifier::from_path(path)?),
        Some("json") => Box::new(LogisticClassifier::from_path(path)?),
        _ => {
            return Err(InferenceError::ModelLoadError(format!(
                "unsupported model format: {}",
                path.display()
            )))
        }
    };
    info!("Loaded {} classifier from {}", classifier.name(), path.display());
    Ok(classifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::Feature;

    fn satisfaction_model() -> LogisticClassifier {
        // Low satisfaction drives turnover
        let mut coefficients = [0.0; FEATURE_DIMENSION];
        coefficients[Feature::SatisfactionLevel.index()] = -4.0;
        LogisticClassifier::new(coefficients, 0.0)
    }

    fn row_with_satisfaction(value: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[Feature::SatisfactionLevel.index()] = value;
        FeatureVector::new(values)
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(TurnoverClass::from_label(1), TurnoverClass::Turnover);
        assert_eq!(TurnoverClass::from_label(0), TurnoverClass::NoTurnover);
        assert_eq!(TurnoverClass::from_label(2), TurnoverClass::NoTurnover);
        assert_eq!(TurnoverClass::Turnover.to_string(), "Turnover");
    }

    #[test]
    fn test_probabilities_serialize_with_class_names() {
        let json = serde_json::to_value(ClassProbabilities::new(0.25, 0.75)).unwrap();
        assert_eq!(json, serde_json::json!({"No Turnover": 0.25, "Turnover": 0.75}));
        assert_eq!(
            serde_json::to_value(TurnoverClass::NoTurnover).unwrap(),
            serde_json::json!("No Turnover")
        );
    }

    #[test]
    fn test_logistic_predictions() {
        let model = satisfaction_model();
        let rows = [row_with_satisfaction(-1.0), row_with_satisfaction(1.0)];

        let classes = model.predict(&rows).unwrap();
        assert_eq!(classes, vec![TurnoverClass::Turnover, TurnoverClass::NoTurnover]);

        let probabilities = model.predict_proba(&rows).unwrap();
        assert!(probabilities[0].turnover > 0.95);
        assert!(probabilities[1].no_turnover > 0.95);
        for p in &probabilities {
            assert!((p.turnover + p.no_turnover - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_boundary_is_no_turnover() {
        let model = satisfaction_model();
        let rows = [row_with_satisfaction(0.0)];
        assert_eq!(model.predict(&rows).unwrap(), vec![TurnoverClass::NoTurnover]);
        assert_eq!(model.predict_proba(&rows).unwrap()[0].turnover, 0.5);
    }

    #[test]
    fn test_classify_pairs_outputs() {
        let model = satisfaction_model();
        let out = model.classify(&[row_with_satisfaction(-2.0)]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, TurnoverClass::Turnover);
        assert!(out[0].1.turnover > 0.5);
    }

    #[test]
    fn test_logistic_from_json() {
        let coefficients = vec![0.1; FEATURE_DIMENSION];
        let text = serde_json::json!({ "coefficients": coefficients, "intercept": -0.5 }).to_string();
        let model = LogisticClassifier::from_json_str(&text).unwrap();
        let row = FeatureVector::new([1.0; FEATURE_DIMENSION]);
        assert!((model.decision_function(&row) - 0.9).abs() < 1e-12);

        let short = serde_json::json!({ "coefficients": [1.0, 2.0], "intercept": 0.0 }).to_string();
        assert!(LogisticClassifier::from_json_str(&short).is_err());
    }

    #[test]
    fn test_unknown_model_format() {
        assert!(matches!(
            load_classifier("artifacts/hr_turnover_model.joblib"),
            Err(InferenceError::ModelLoadError(msg)) if msg.contains("unsupported")
        ));
        assert!(matches!(
            load_classifier("does/not/exist.json"),
            Err(InferenceError::ModelLoadError(_))
        ));
    }
}

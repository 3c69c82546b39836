//! Turnover Inference Engine
//!
//! Loads the fitted scaler and classifier artifacts once and runs them over
//! preprocessed feature vectors. ONNX models are executed with tract.

mod artifact;
mod classifier;
mod engine;
mod onnx;
mod scaler;

pub use classifier::{load_classifier, ClassProbabilities, Classifier, LogisticClassifier, TurnoverClass};
pub use engine::{InferenceEngine, Prediction};
pub use onnx::OnnxClassifier;
pub use scaler::{Scaler, StandardScaler};

use thiserror::Error;

/// Errors during artifact loading or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Artifact column {position} is {found:?}, expected {expected:?}")]
    FeatureMismatch {
        position: usize,
        expected: &'static str,
        found: String,
    },
}

//! Preprocessing Error Types

use thiserror::Error;

/// Errors raised while turning raw records into feature vectors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreprocessError {
    /// A field needed by an encoding or a derived feature is absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A numeric field was supplied as text that does not parse
    #[error("Could not convert {field} value {value:?} to a number")]
    MalformedNumber { field: &'static str, value: String },

    /// A field holds a JSON value of the wrong kind
    #[error("Invalid {kind} value for {field}")]
    InvalidValue {
        field: &'static str,
        kind: &'static str,
    },

    /// Categorical value outside the encoding table
    #[error("Unknown {field} category: {value}")]
    UnknownCategory { field: &'static str, value: String },

    /// Derived feature would divide by zero
    #[error("Division by zero while computing {feature}")]
    DivisionByZero { feature: &'static str },

    /// Assembled feature is NaN or infinite
    #[error("{feature} is not finite ({value})")]
    NonFinite { feature: &'static str, value: f64 },

    /// Request body is neither a record nor a list of records
    #[error("Invalid input payload: {0}")]
    InvalidPayload(String),

    /// A record inside a batch failed; the whole batch is rejected
    #[error("Record {index}: {source}")]
    RecordFailed {
        index: usize,
        #[source]
        source: Box<PreprocessError>,
    },
}

impl PreprocessError {
    /// Innermost error, unwrapping batch context
    pub fn root(&self) -> &PreprocessError {
        match self {
            PreprocessError::RecordFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

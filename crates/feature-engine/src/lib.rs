//! Feature Engineering Engine
//!
//! Turns raw employee records into the fixed 14-column feature vectors the
//! turnover model was trained on: categorical encoding, derived features,
//! column ordering and input validation.

mod encoding;
mod error;
mod features;
mod record;

pub use encoding::{Department, Salary};
pub use error::PreprocessError;
pub use features::{preprocess, Feature, FeatureVector, FEATURE_DIMENSION, INVESTMENT_CENTER};
pub use record::{Payload, RawRecord};

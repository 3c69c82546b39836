//! Shared helpers for JSON model artifacts

use crate::InferenceError;
use feature_engine::{Feature, FEATURE_DIMENSION};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and decode a JSON artifact
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InferenceError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
    parse_json(&text)
}

pub(crate) fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, InferenceError> {
    serde_json::from_str(text).map_err(|e| InferenceError::ModelLoadError(e.to_string()))
}

/// Convert a per-feature parameter list into a fixed-width array
pub(crate) fn per_feature(
    what: &str,
    values: Vec<f64>,
) -> Result<[f64; FEATURE_DIMENSION], InferenceError> {
    let actual = values.len();
    let array: [f64; FEATURE_DIMENSION] =
        values.try_into().map_err(|_| InferenceError::InvalidInputShape {
            expected: format!("{FEATURE_DIMENSION} {what} values"),
            actual: actual.to_string(),
        })?;
    if let Some(i) = array.iter().position(|v| !v.is_finite()) {
        return Err(InferenceError::ModelLoadError(format!(
            "{what} for {} is not finite",
            Feature::ALL[i].name()
        )));
    }
    Ok(array)
}

/// Artifacts fit on a named frame must list the columns in canonical order
pub(crate) fn check_feature_names(names: Option<&[String]>) -> Result<(), InferenceError> {
    let Some(names) = names else {
        return Ok(());
    };
    if names.len() != FEATURE_DIMENSION {
        return Err(InferenceError::InvalidInputShape {
            expected: format!("{FEATURE_DIMENSION} feature names"),
            actual: names.len().to_string(),
        });
    }
    for (position, (feature, found)) in Feature::ALL.iter().zip(names).enumerate() {
        if feature.name() != found {
            return Err(InferenceError::FeatureMismatch {
                position,
                expected: feature.name(),
                found: found.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_checked_in_order() {
        let mut names: Vec<String> = Feature::ALL.iter().map(|f| f.name().to_string()).collect();
        assert!(check_feature_names(Some(&names)).is_ok());
        assert!(check_feature_names(None).is_ok());

        names.swap(7, 8);
        match check_feature_names(Some(&names)) {
            Err(InferenceError::FeatureMismatch { position, expected, found }) => {
                assert_eq!(position, 7);
                assert_eq!(expected, "department");
                assert_eq!(found, "salary");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        names.pop();
        assert!(matches!(
            check_feature_names(Some(&names)),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_per_feature_length_and_finiteness() {
        assert!(per_feature("mean", vec![0.0; FEATURE_DIMENSION]).is_ok());
        assert!(matches!(
            per_feature("mean", vec![0.0; 9]),
            Err(InferenceError::InvalidInputShape { .. })
        ));
        let mut values = vec![1.0; FEATURE_DIMENSION];
        values[3] = f64::NAN;
        assert!(matches!(
            per_feature("scale", values),
            Err(InferenceError::ModelLoadError(msg)) if msg.contains("average_monthly_hours")
        ));
    }
}

//! Prediction Routes

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use feature_engine::{preprocess, Payload, RawRecord};
use inference_engine::Prediction;
use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// `POST /predict`: one record or a list of records as JSON
pub async fn predict_post(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Payload<Prediction>>, ApiError> {
    let value = parse_body(&body)?;
    let input = Payload::from_json(value)?;
    debug!(
        "POST /predict with {} record(s), batch={}",
        input.len(),
        input.is_batch()
    );
    let predictions = run_pipeline(state, input, "post").await?;
    Ok(Json(predictions))
}

/// `GET /predict`: a single record from query parameters
pub async fn predict_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Prediction>, ApiError> {
    let record = RawRecord::from_query(params);
    if record.is_empty() {
        return Err(ApiError::NoInputParameters);
    }
    debug!("GET /predict with {} field(s)", record.len());
    let prediction = run_pipeline(state, Payload::Single(record), "get")
        .await?
        .into_vec()
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("no prediction produced".to_string()))?;
    Ok(Json(prediction))
}

/// Decode a request body, treating empty JSON values as absent input
fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::NoInputData);
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidJson(e.to_string()))?;
    if is_empty_value(&value) {
        return Err(ApiError::NoInputData);
    }
    Ok(value)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Preprocess, scale and classify on the blocking pool
async fn run_pipeline(
    state: Arc<AppState>,
    input: Payload<RawRecord>,
    method: &'static str,
) -> Result<Payload<Prediction>, ApiError> {
    let result = tokio::task::spawn_blocking(move || {
        let features = preprocess(&input)?;
        let start = std::time::Instant::now();
        let predictions = state.engine.predict_payload(&features)?;
        histogram!("turnover_inference_seconds").record(start.elapsed().as_secs_f64());
        Ok::<_, ApiError>(predictions)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    let outcome = if result.is_ok() { "ok" } else { "error" };
    counter!("turnover_requests_total", "method" => method, "outcome" => outcome).increment(1);
    if let Ok(predictions) = &result {
        for prediction in predictions.as_slice() {
            counter!("turnover_predictions_total", "label" => prediction.class.as_str())
                .increment(1);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_bodies() {
        assert!(matches!(parse_body(b""), Err(ApiError::NoInputData)));
        assert!(matches!(parse_body(b"  \n"), Err(ApiError::NoInputData)));
        for body in ["{}", "[]", "null", "false", "0", "\"\""] {
            assert!(
                matches!(parse_body(body.as_bytes()), Err(ApiError::NoInputData)),
                "{body} should count as no input"
            );
        }
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_body(b"{\"salary\":").unwrap_err();
        assert!(matches!(err, ApiError::InvalidJson(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_non_empty_values_pass() {
        assert_eq!(parse_body(b"{\"salary\":\"low\"}").unwrap(), json!({"salary": "low"}));
        assert_eq!(parse_body(b"[{}]").unwrap(), json!([{}]));
        assert_eq!(parse_body(b"7").unwrap(), json!(7));
    }
}

//! Handler for summing an array of integers.
//!
//! Accepts `POST /sum` with a JSON body of the form `{"numbers": [1, 2, 3]}` and
//! answers with `{"result": 6}`. Every failure is reported as an `AppError`.

use axum::{body::Bytes, extract::rejection::BytesRejection, http::Method, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;

/// Request payload for the sum endpoint
#[derive(Debug, Deserialize)]
pub struct SumRequest {
    /// Integers to add. A missing field or `null` counts as empty.
    #[serde(default)]
    pub numbers: Option<Vec<i64>>,
}

/// Successful sum response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SumResponse {
    pub result: i64,
}

/// Add the numbers in order with 64-bit wraparound on overflow.
pub fn sum_numbers(numbers: &[i64]) -> i64 {
    numbers.iter().fold(0i64, |acc, &n| acc.wrapping_add(n))
}

/// Decode and validate the request body into a non-empty list of integers.
fn parse_numbers(body: &[u8]) -> Result<Vec<i64>, AppError> {
    let request: SumRequest = serde_json::from_slice(body).map_err(AppError::InvalidJson)?;
    let numbers = request.numbers.unwrap_or_default();

    if numbers.is_empty() {
        return Err(AppError::EmptyNumbers);
    }

    Ok(numbers)
}

/// Sum handler.
///
/// Routed for every method so the method check can answer with the JSON
/// error shape instead of the router's bare 405. Body read failures are
/// taken as a `Result` so they also render as JSON, and only after the
/// method check.
#[instrument(name = "sum", skip(body))]
pub async fn sum(
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SumResponse>, AppError> {
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed(method));
    }

    let body = body?;
    tracing::debug!(body_len = body.len(), "Read request body");

    let numbers = parse_numbers(&body)?;
    tracing::info!(count = numbers.len(), numbers = ?numbers, "Parsed numbers");

    let result = sum_numbers(&numbers);
    tracing::info!(result, "Calculated sum");

    Ok(Json(SumResponse { result }))
}

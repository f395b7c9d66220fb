//! Shared request helpers used across endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::error::RelayError;

/// Unwraps a JSON body, reporting malformed bodies as validation errors
/// (400) instead of Axum's default rejection statuses.
///
/// # Errors
///
/// Returns [`RelayError::Validation`] if the body could not be parsed.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RelayError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| RelayError::Validation(rejection.body_text()))
}

/// Returns the value of a required string field.
///
/// Only an absent or empty value counts as missing. Anything else,
/// whitespace included, is returned unchanged.
///
/// # Errors
///
/// Returns [`RelayError::Validation`] naming the missing field.
pub fn required(value: Option<String>, field: &str) -> Result<String, RelayError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RelayError::Validation(format!("{field} is required")))
}

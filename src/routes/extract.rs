//! JSON body helpers that keep extractor failures in the `{"message": ...}` shape.

use axum::{Json, extract::rejection::JsonRejection};
use validator::Validate;

use crate::error::AppError;

/// Unwrap a JSON body, turning malformed or mistyped payloads into a 400.
pub(crate) fn extract_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// [`extract_json`] followed by the DTO's `validator` rules.
pub(crate) fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(body)?;
    value.validate()?;
    Ok(value)
}

use crate::errors::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Serializes a response body for the view cache.
pub fn to_cached_value<T: Serialize>(data: &T) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(data)
        .map_err(|e| ServiceError::InternalError(format!("response serialization failed: {}", e)))
}

/// Rejects a missing required field, naming it for the caller.
pub fn require<T>(value: Option<T>, field: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::ValidationError(format!("Missing field: {}", field)))
}

/// Trims a string field and rejects blank values.
pub fn require_non_blank(value: String, field: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{} cannot be blank",
            field
        )));
    }
    Ok(trimmed)
}

pub fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .and_then(|v| if v.is_empty() { None } else { Some(v) })
}

pub fn ensure_decimal_non_negative(
    value: &rust_decimal::Decimal,
    field: &str,
) -> Result<(), ServiceError> {
    if *value < rust_decimal::Decimal::ZERO {
        Err(ServiceError::ValidationError(format!(
            "{} cannot be negative",
            field
        )))
    } else {
        Ok(())
    }
}

pub fn ensure_i32_non_negative(value: i32, field: &str) -> Result<(), ServiceError> {
    if value < 0 {
        Err(ServiceError::ValidationError(format!(
            "{} cannot be negative",
            field
        )))
    } else {
        Ok(())
    }
}

pub fn ensure_i32_positive(value: i32, field: &str) -> Result<(), ServiceError> {
    if value < 1 {
        Err(ServiceError::ValidationError(format!(
            "{} must be positive",
            field
        )))
    } else {
        Ok(())
    }
}

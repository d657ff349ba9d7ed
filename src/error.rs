// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Single field failure inside a validation error envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation(Vec<FieldError>),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden (CSRF and role/permission failures, fail-closed)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (unique-constraint violations)
    Conflict(String),

    // 413 Payload Too Large (upload size cap)
    PayloadTooLarge(String),

    // 415 Unsupported Media Type (upload MIME allow-list)
    UnsupportedMediaType(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::UnsupportedMediaType(_) => 415,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Validation(_) => "Validation failed",
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::UnsupportedMediaType(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to the wire envelope.
    ///
    /// Validation failures get the itemized envelope consumed by admin-UI
    /// forms; everything else uses the flat `{message, statusCode}` shape
    /// the guards and services emit.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation(errors) => json!({
                "version": "1",
                "code": 400,
                "status": false,
                "message": "Validation failed",
                "validationErrors": errors,
                "data": null,
            }),
            _ => json!({
                "message": self.message(),
                "statusCode": self.status_code(),
            }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        ApiError::UnsupportedMediaType(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::not_found("Record not found"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::conflict("Duplicate record")
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                tracing::error!("Database pool error: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            _ => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_uses_flat_envelope() {
        let err = ApiError::forbidden("Invalid CSRF token");
        let body = err.to_json();
        assert_eq!(body["message"], "Invalid CSRF token");
        assert_eq!(body["statusCode"], 403);
        assert!(body.get("validationErrors").is_none());
    }

    #[test]
    fn validation_envelope_is_itemized() {
        let err = ApiError::validation(vec![FieldError::new("name", "must not be empty")]);
        let body = err.to_json();
        assert_eq!(body["code"], 400);
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["validationErrors"][0]["field"], "name");
        assert_eq!(body["data"], serde_json::Value::Null);
    }

    #[test]
    fn conflict_maps_to_409() {
        assert_eq!(ApiError::conflict("duplicate section name").status_code(), 409);
    }
}

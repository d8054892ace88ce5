//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tripsearch_core::search::QueryError;
use tripsearch_core::storage::StoreError;

/// Application-level error type that implements `IntoResponse`.
///
/// Each variant maps to an HTTP status code:
/// - `BadRequest` → 400
/// - `Unauthorized` → 401
/// - `Forbidden` → 403
/// - `NotFound` → 404
/// - `Gone` → 410
/// - `Internal` → 500
/// - `ServiceUnavailable` → 503
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request parameters or payload (400).
    BadRequest(String),
    /// Missing or invalid authentication (401).
    Unauthorized(String),
    /// Caller does not own the trip (403).
    Forbidden(String),
    /// Trip not found or deleted (404).
    NotFound(String),
    /// Route retired for good (410).
    Gone(String),
    /// Stored data the server cannot read (500).
    Internal(String),
    /// Backing store unreachable (503).
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Gone(msg) => (StatusCode::GONE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            StoreError::Invalid(_) => ApiError::BadRequest(err.to_string()),
            StoreError::Corrupt(_) => ApiError::Internal(err.to_string()),
            StoreError::Unavailable(_) => {
                tracing::error!("Trip store unavailable: {}", err);
                ApiError::ServiceUnavailable(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Gone("x".into()), StatusCode::GONE),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_store_errors_map_to_http() {
        let not_found: ApiError = StoreError::NotFound("t1".into()).into();
        assert!(matches!(not_found, ApiError::NotFound(_)));
        let forbidden: ApiError = StoreError::Forbidden("t1".into()).into();
        assert!(matches!(forbidden, ApiError::Forbidden(_)));
        let unavailable: ApiError = StoreError::Unavailable("down".into()).into();
        assert!(matches!(unavailable, ApiError::ServiceUnavailable(_)));
        let corrupt: ApiError = StoreError::Corrupt("t1".into()).into();
        assert!(matches!(corrupt, ApiError::Internal(_)));
    }

    #[test]
    fn test_query_error_is_bad_request() {
        let err: ApiError = QueryError::MissingCity.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}

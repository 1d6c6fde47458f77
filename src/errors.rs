// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the marker orchestration core

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: None of these is fatal to the application. The controller turns
/// them into empty or last-known-good results plus an advisory notice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacesError {
    /// Timeout or connectivity problem
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// Unparsable payload, missing fields, invalid coordinates
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Provider quota exhausted (remote OVER_QUERY_LIMIT or the local guard)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Backend error {status}: {message}")]
    BackendError { status: u16, message: String },

    /// State referring to data that is no longer present
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access")]
    Unauthorized,
}

impl PlacesError {
    /// Errors after which results are withheld until the next successful cycle
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlacesError::NetworkFailure(_)
                | PlacesError::RateLimitExceeded
                | PlacesError::ExternalApiError(_)
        )
    }

    /// Short, non-blocking advisory text for the map screen
    pub fn user_message(&self) -> String {
        match self {
            PlacesError::NetworkFailure(_) | PlacesError::ExternalApiError(_) => {
                "Connection problem. Showing the places we already have.".to_string()
            }
            PlacesError::RateLimitExceeded => {
                "Nearby suggestions are paused for a moment.".to_string()
            }
            PlacesError::MalformedResponse(_) => {
                "Some places could not be loaded.".to_string()
            }
            PlacesError::BackendError { message, .. } if !message.is_empty() => message.clone(),
            PlacesError::BackendError { .. } => "Failed to fetch places.".to_string(),
            PlacesError::InvariantViolation(_) => "That place is no longer on the map.".to_string(),
            other => other.to_string(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            PlacesError::NetworkFailure(_) => "NETWORK_FAILURE",
            PlacesError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            PlacesError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            PlacesError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            PlacesError::BackendError { .. } => "BACKEND_ERROR",
            PlacesError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            PlacesError::NotFound(_) => "NOT_FOUND",
            PlacesError::InvalidInput(_) => "INVALID_INPUT",
            PlacesError::ValidationError(_) => "VALIDATION_ERROR",
            PlacesError::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl From<reqwest::Error> for PlacesError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PlacesError::MalformedResponse(e.to_string())
        } else {
            PlacesError::NetworkFailure(e.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for PlacesError {
    fn from(e: validator::ValidationErrors) -> Self {
        PlacesError::ValidationError(e.to_string())
    }
}

/// Convert PlacesError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlacesError::NetworkFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            PlacesError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            PlacesError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            PlacesError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            PlacesError::BackendError { .. } => StatusCode::BAD_GATEWAY,
            PlacesError::InvariantViolation(_) => StatusCode::CONFLICT,
            PlacesError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlacesError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PlacesError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PlacesError::NetworkFailure("timeout".into()).is_transient());
        assert!(PlacesError::RateLimitExceeded.is_transient());
        assert!(!PlacesError::MalformedResponse("x".into()).is_transient());
        assert!(!PlacesError::InvariantViolation("x".into()).is_transient());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PlacesError::NotFound("session".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PlacesError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(PlacesError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_backend_message_is_surfaced() {
        let err = PlacesError::BackendError {
            status: 500,
            message: "Database offline".into(),
        };
        assert_eq!(err.user_message(), "Database offline");

        let err = PlacesError::BackendError {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Failed to fetch places.");
    }
}

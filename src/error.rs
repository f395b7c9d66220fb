//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type for the synchronous request
//! path (registration, subscription, publish). Each variant maps to a
//! specific HTTP status code and structured JSON error response.
//!
//! Delivery failures on the asynchronous dispatch path use
//! [`DeliveryError`] instead: they are terminal at the notification
//! sender and never reach an HTTP response.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "subscriber already registered: a@x.com"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`RelayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category     | HTTP Status               |
/// |-----------|--------------|---------------------------|
/// | 1000–1999 | Validation   | 400 Bad Request           |
/// | 2000–2999 | Registry     | 400 Bad Request           |
/// | 3000–3999 | Server       | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A required request field is missing or the body is malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// An address was registered twice.
    #[error("subscriber already registered: {0}")]
    DuplicateSubscriber(String),

    /// The address has never been registered.
    #[error("subscriber not found: {0}")]
    SubscriberNotFound(String),

    /// Subscriber storage failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The broker (or another transport) connection is down.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::DuplicateSubscriber(_) => 2001,
            Self::SubscriberNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::TransportUnavailable(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateSubscriber(_) | Self::SubscriberNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Persistence(_) | Self::TransportUnavailable(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for RelayError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Failure of a single notification delivery attempt.
///
/// Never propagated past the notification sender; it is folded into a
/// [`crate::domain::DeliveryOutcome`] and logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The outbound transport could not be reached or the request failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The outbound transport answered with a non-success status.
    #[error("rejected by mail provider (status {status}): {body}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The attempt did not finish within the configured send timeout.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    /// The delivery job aborted before producing a result.
    #[error("delivery job aborted: {0}")]
    Aborted(String),
}

//! Unified error types for the relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::rlm::validation::FieldError;

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment could not be deserialized.
    #[error("configuration error: {0}")]
    Load(#[from] envy::Error),

    /// A setting failed validation.
    #[error("invalid {var}: {reason}")]
    Invalid {
        /// Environment variable name.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Errors raised while handling a relayed request.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Required fields missing or of the wrong type.
    #[error("request validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Body could not be read as JSON.
    #[error("invalid request body: {reason}")]
    InvalidBody {
        /// Status chosen by the extractor.
        status: StatusCode,
        /// Rejection text.
        reason: String,
    },

    /// Upstream could not be reached.
    #[error("Error making request to RLM API: {0}")]
    UpstreamUnreachable(String),

    /// Upstream did not answer within the configured timeout.
    #[error("Error making request to RLM API: timed out after {timeout_secs}s")]
    UpstreamTimeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Upstream answered but its body could not be read.
    #[error("Error reading RLM API response: {0}")]
    UpstreamBody(String),

    /// Client could not be built.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Configuration error surfaced on the request path.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RelayError {
    /// HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::InvalidBody { status, .. } => *status,
            RelayError::UpstreamUnreachable(_) | RelayError::UpstreamBody(_) => {
                StatusCode::BAD_GATEWAY
            }
            RelayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Client(_) | RelayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            RelayError::Validation(detail) => {
                (status, Json(ValidationDetail { detail })).into_response()
            }
            other => (
                status,
                Json(ErrorDetail {
                    detail: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// Body of every non-validation error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// What went wrong.
    pub detail: String,
}

/// Body of a 422 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationDetail {
    /// One entry per failed field.
    pub detail: Vec<FieldError>,
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, RelayError>;

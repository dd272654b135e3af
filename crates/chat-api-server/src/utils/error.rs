use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Settings or seed document unusable. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Append without a prior create. Indicates a bug in the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Configuration(_) => "ConfigurationError",
            ApiError::InvalidInput(_) => "InvalidInputError",
            ApiError::NotFound(_) => "NotFoundError",
            ApiError::Provider(_) => "ProviderError",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Configuration(err.to_string())
    }
}

/// Unreadable request bodies (wrong content type, bad JSON, `null` prompt)
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_type = self.kind();
        let (status, detail) = match self {
            ApiError::InvalidInput(msg) => {
                tracing::warn!("Invalid input: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Provider(msg) => {
                tracing::error!("Provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            ApiError::NotFound(msg) => {
                tracing::error!("Conversation invariant violated: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::Configuration(msg) | ApiError::Internal(msg) => {
                tracing::error!("{}: {}", error_type, msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            detail,
        });

        (status, body).into_response()
    }
}

//! Error types shared across the service.

use crate::models::{ErrorDetail, ErrorResponse};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::path::PathBuf;
use thiserror::Error;

/// Invalid configuration detected while the process starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("rate limit policy '{policy}' must allow at least one request")]
    NonPositiveLimit { policy: String },

    #[error("rate limit policy '{policy}' must have a positive window")]
    NonPositiveWindow { policy: String },

    #[error("rate limit policy '{policy}' has a window that is too large")]
    WindowOutOfRange { policy: String },
}

/// Failures loading or persisting the flat JSON data files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode questions: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("question store task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

/// Anything that prevents the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] DataError),

    #[error("{0} is not configured")]
    Unavailable(&'static str),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation { .. } => "validation_error",
            ApiError::Storage(_) => "storage_error",
            ApiError::Unavailable(_) => "service_unavailable",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(err) = self {
            tracing::error!(error = %err, "Request failed with a storage error");
        }

        let details = match self {
            ApiError::Validation { details, .. } => details.clone(),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                details,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound("Talk 'x' not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Unavailable("seed data").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::NonPositiveLimit {
            policy: "profile".into(),
        };
        assert_eq!(
            err.to_string(),
            "rate limit policy 'profile' must allow at least one request"
        );

        let err = ConfigError::InvalidValue {
            key: "PORT".into(),
            value: "eighty".into(),
        };
        assert_eq!(err.to_string(), "invalid value for PORT: \"eighty\"");
    }
}

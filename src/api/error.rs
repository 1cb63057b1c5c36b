use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use thiserror::Error;

use super::ApiResponse;
use crate::clients::TranslateError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{service} error: {message}")]
    ExternalApiError { service: String, message: String },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} service is unavailable"),
                )
            }
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<TranslateError> for ApiError {
    fn from(err: TranslateError) -> Self {
        match err {
            TranslateError::NotConfigured
            | TranslateError::MissingToken
            | TranslateError::ModelLoading => {
                Self::Unavailable(err.to_string())
            }
            other => Self::ExternalApiError {
                service: "Translation".to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_errors_map_to_status() {
        let not_configured = ApiError::from(TranslateError::NotConfigured);
        assert!(
            matches!(&not_configured, ApiError::Unavailable(msg) if msg.contains("not configured"))
        );
        assert_eq!(
            not_configured.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let missing_token = ApiError::from(TranslateError::MissingToken);
        assert!(matches!(&missing_token, ApiError::Unavailable(msg) if msg.contains("token")));

        let unrecognized = ApiError::from(TranslateError::UnrecognizedResponse);
        assert_eq!(
            unrecognized.into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}

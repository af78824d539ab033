use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::forms::FieldErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Form input rejected; carries every field error at once (400).
    #[error("the submitted form has errors")]
    Validation(FieldErrors),

    /// Body is not JSON or has the wrong shape (400).
    #[error("{0}")]
    MalformedBody(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Authenticated but not allowed to do this (403).
    #[error("{0}")]
    Forbidden(&'static str),

    /// Missing, invalid or expired token (401).
    #[error("authentication required")]
    Unauthorized,

    #[error("invalid username or password")]
    InvalidCredentials,

    /// Store or runtime failure (500, logged, not echoed).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::MalformedBody(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::Unauthorized | Self::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            Self::Internal(e) => {
                error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = match self {
            Self::Validation(fields) => json!({
                "error": code,
                "message": "the submitted form has errors",
                "fields": fields,
            }),
            Self::Internal(_) => json!({
                "error": code,
                "message": "an internal error occurred",
            }),
            other => json!({
                "error": code,
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

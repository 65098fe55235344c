//! API error types.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::services::AnalysisError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for any upstream failure. Provider detail stays in the logs.
pub const UPSTREAM_FAILURE_MESSAGE: &str =
    "Failed to get an analysis from YouTube or the AI service. Check the backend logs.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Only POST requests allowed")]
    MethodNotAllowed,

    #[error("{}", UPSTREAM_FAILURE_MESSAGE)]
    Upstream,

    #[error("An internal error occurred")]
    Internal,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::InvalidInput(e) => ApiError::BadRequest(e.to_string()),
            AnalysisError::UpstreamFetch(_) | AnalysisError::UpstreamGeneration(_) => {
                ApiError::Upstream
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        match self {
            ApiError::MethodNotAllowed => {
                (status, [(header::ALLOW, "POST")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

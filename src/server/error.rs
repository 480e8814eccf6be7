//! API error responses

use crate::transcripts::TranscriptError;
use axum::{http::StatusCode, response::IntoResponse};

/// API error responses
/// Converted to HTTP status codes via IntoResponse
#[derive(Debug)]
pub enum ApiError {
    Internal(String),
    BadRequest(String),
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast_ref::<TranscriptError>() {
            Some(e @ TranscriptError::InvalidName(_)) => ApiError::BadRequest(e.to_string()),
            Some(e @ TranscriptError::NotFound(_)) => ApiError::NotFound(e.to_string()),
            None => ApiError::Internal(format!("{:#}", error)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(msg) | ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
        };

        if status.is_server_error() {
            tracing::error!("API error: {} - {}", status, message);
        } else {
            tracing::warn!("API error: {} - {}", status, message);
        }

        (status, message).into_response()
    }
}

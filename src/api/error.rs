use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::core::InvalidInputError;

use super::json_response;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error("Invalid request payload: {0}")]
    MalformedPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found")]
    NotFound,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let field = match &self {
            ApiError::InvalidInput(err) => Some(err.field),
            _ => None,
        };
        let error = match &self {
            ApiError::InvalidInput(_) | ApiError::MalformedPayload(_) => {
                tracing::warn!(error = %self, "rejected request");
                self.to_string()
            }
            ApiError::Serialization(_) => {
                tracing::error!(error = %self, "failed to encode response");
                "Internal server error".to_string()
            }
            ApiError::NotFound => self.to_string(),
        };
        json_response(self.status(), ErrorResponse { error, field })
    }
}

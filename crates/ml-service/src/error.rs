//! HTTP error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use predictor_lib::flights::FlightStatusError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("invalid request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error("no status known for flight {0}")]
    FlightNotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedBody(rejection) => rejection.status(),
            ApiError::FlightNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) | ApiError::MalformedBody(_) => "INVALID_REQUEST",
            ApiError::FlightNotFound(_) => "FLIGHT_NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn body(&self) -> ErrorResponse {
        let (message, details) = match self {
            ApiError::MalformedBody(rejection) => (
                "Request body could not be parsed".to_string(),
                Some(serde_json::json!({ "reason": rejection.body_text() })),
            ),
            ApiError::FlightNotFound(flight) => (
                self.to_string(),
                Some(serde_json::json!({ "flight": flight })),
            ),
            // Internal details stay in the logs
            ApiError::Internal(_) => ("Internal server error".to_string(), None),
            ApiError::InvalidRequest(message) => (message.clone(), None),
        };

        ErrorResponse {
            code: self.code().to_string(),
            message,
            details,
        }
    }
}

impl From<FlightStatusError> for ApiError {
    fn from(err: FlightStatusError) -> Self {
        match err {
            FlightStatusError::MissingFlightId => ApiError::InvalidRequest(err.to_string()),
            FlightStatusError::NotFound(flight) => ApiError::FlightNotFound(flight),
            FlightStatusError::Storage(source) => ApiError::Internal(source),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            error!(error = ?err, "Request failed");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The OAuth provider rejected a refresh or code grant.
    #[error("Strava auth error: HTTP {status}: {body}")]
    Auth { status: u16, body: String },

    #[error("No refresh token available; set REFRESH_TOKEN or authorize via /auth/strava")]
    MissingRefreshToken,

    /// Non-2xx, transport failure or timeout on a data call.
    #[error("Strava API error: {0}")]
    Upstream(String),

    /// Malformed webhook body or unexpected event shape.
    #[error("Invalid event: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether retrying the same operation may succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Upstream(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Upstream(format!("request timed out: {}", err))
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Auth { status, .. } => {
                tracing::error!(status, "Strava rejected the token grant");
                (StatusCode::UNAUTHORIZED, "auth_error", None)
            }
            AppError::MissingRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "not_authorized",
                Some(self.to_string()),
            ),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone())),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_event", Some(msg.clone()))
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

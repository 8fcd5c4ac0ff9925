// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use strava_totals::error::AppError;

fn status_of(err: AppError) -> StatusCode {
    err.into_response().status()
}

#[test]
fn test_only_upstream_errors_are_retryable() {
    assert!(AppError::Upstream("HTTP 503".to_string()).is_retryable());

    assert!(!AppError::Auth {
        status: 401,
        body: String::new()
    }
    .is_retryable());
    assert!(!AppError::MissingRefreshToken.is_retryable());
    assert!(!AppError::Validation("bad".to_string()).is_retryable());
    assert!(!AppError::Internal(anyhow::anyhow!("boom")).is_retryable());
}

#[test]
fn test_status_mapping() {
    assert_eq!(
        status_of(AppError::Auth {
            status: 400,
            body: "invalid".to_string()
        }),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        status_of(AppError::MissingRefreshToken),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        status_of(AppError::Upstream("HTTP 500".to_string())),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        status_of(AppError::Validation("bad".to_string())),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_of(AppError::Forbidden("no".to_string())),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        status_of(AppError::BadRequest("no".to_string())),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_of(AppError::Internal(anyhow::anyhow!("boom"))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_auth_error_body_hides_provider_response() {
    let response = AppError::Auth {
        status: 400,
        body: "refresh_token invalid".to_string(),
    }
    .into_response();

    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "auth_error");
    assert!(json.get("details").is_none());
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for Strava events.

use crate::error::{AppError, Result};
use crate::models::ActivityEvent;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Json, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Largest event body we read. Strava events are a few hundred bytes.
const MAX_EVENT_BYTES: usize = 64 * 1024;

/// Bytes of a rejected body included in the warning log.
const LOGGED_BODY_BYTES: usize = 512;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", get(verify).post(handle_event))
}

/// Strava webhook verification query params.
#[derive(Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode", default)]
    mode: Option<String>,
    #[serde(rename = "hub.challenge", default)]
    challenge: Option<String>,
    #[serde(rename = "hub.verify_token", default)]
    verify_token: Option<String>,
}

/// Verification response.
#[derive(Serialize)]
struct VerifyResponse {
    #[serde(rename = "hub.challenge")]
    challenge: String,
}

/// Verify webhook subscription (GET).
async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<VerifyResponse>> {
    let token_matches = params.verify_token.as_deref().is_some_and(|token| {
        token
            .as_bytes()
            .ct_eq(state.config.verify_token.as_bytes())
            .into()
    });

    if !token_matches {
        tracing::warn!(
            mode = ?params.mode,
            "Webhook verification failed: invalid token"
        );
        return Err(AppError::Forbidden("Invalid verification token".to_string()));
    }

    let challenge = params
        .challenge
        .ok_or_else(|| AppError::BadRequest("missing hub.challenge".to_string()))?;

    tracing::info!(mode = ?params.mode, "Webhook subscription verified");
    Ok(Json(VerifyResponse { challenge }))
}

/// Handle incoming webhook events (POST).
///
/// Always acknowledges with 200; processing outcome only shows up in logs.
async fn handle_event(State(state): State<Arc<AppState>>, body: Body) -> StatusCode {
    let body = match axum::body::to_bytes(body, MAX_EVENT_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(
                error = %e,
                limit = MAX_EVENT_BYTES,
                "Ignoring unreadable or oversized webhook body"
            );
            return StatusCode::OK;
        }
    };

    let event: ActivityEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            let err = AppError::Validation(e.to_string());
            let shown = &body[..body.len().min(LOGGED_BODY_BYTES)];
            tracing::warn!(
                error = %err,
                body = %String::from_utf8_lossy(shown),
                body_len = body.len(),
                "Ignoring malformed webhook event"
            );
            return StatusCode::OK;
        }
    };

    tracing::info!(
        object_type = ?event.object_type,
        object_id = event.object_id,
        aspect_type = ?event.aspect_type,
        owner_id = event.owner_id,
        "Webhook event received"
    );

    if event.is_activity_create() {
        // Detached: the task logs its own outcome.
        let _ = state.updater.spawn_update(event.object_id);
    } else {
        tracing::debug!(
            object_type = ?event.object_type,
            aspect_type = ?event.aspect_type,
            "Ignoring unhandled event type"
        );
    }

    StatusCode::OK
}

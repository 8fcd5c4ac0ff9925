// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authorization routes.
//!
//! One-time setup: an athlete visits `/auth/strava`, approves the app, and
//! the callback installs the resulting token triple in the token store.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava", get(auth_start))
        .route("/auth/strava/callback", get(auth_callback))
}

/// Start OAuth flow - redirect to Strava authorization.
async fn auth_start(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    let callback_url = state
        .config
        .redirect_uri
        .clone()
        .unwrap_or_else(|| callback_url_from_host(&headers));

    tracing::info!(
        client_id = %state.strava.client_id(),
        callback_url = %callback_url,
        "Starting OAuth flow, redirecting to Strava"
    );

    Redirect::temporary(&state.strava.authorize_url(&callback_url))
}

/// Build the callback URL from the request's Host header.
fn callback_url_from_host(headers: &HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/auth/strava/callback", scheme, host)
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    /// Scopes the athlete actually granted
    #[serde(default)]
    scope: Option<String>,
}

/// OAuth callback - exchange code for tokens and install them.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::BadRequest(format!("authorization denied: {}", error)));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing code".to_string()))?;

    if let Some(scope) = params.scope.as_deref() {
        if !scope.contains("activity:write") {
            tracing::warn!(scope, "Athlete did not grant activity:write; updates will fail");
        }
    }

    tracing::info!("Exchanging authorization code for tokens");
    let tokens = state.strava.exchange_code(&code).await?;
    state.tokens.install(tokens.into()).await;

    tracing::info!("OAuth successful, tokens stored");
    Ok(Redirect::temporary("/totals"))
}

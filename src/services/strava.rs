// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for fetching and updating activities.
//!
//! Handles:
//! - OAuth refresh and authorization-code grants
//! - Activity fetching and listing
//! - Activity description updates
//!
//! Grant failures surface as `AppError::Auth`; everything else that goes
//! wrong on the wire (non-2xx, timeouts, bad JSON) is `AppError::Upstream`.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{StravaActivity, StravaActivitySummary, TokenState};
use serde::Deserialize;
use std::time::Duration;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(
        client_id: String,
        client_secret: String,
        api_url: String,
        oauth_url: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            oauth_url: oauth_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.strava_api_url.clone(),
            config.strava_oauth_url.clone(),
            config.http_timeout,
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// URL of the provider's authorization page.
    pub fn authorize_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}/authorize?client_id={}&response_type=code&redirect_uri={}&approval_prompt=auto&scope={}",
            self.oauth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode("activity:read_all,activity:write"),
        )
    }

    /// Exchange a refresh token for a new token triple.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.token_grant(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    /// Exchange an authorization code for a token triple.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        self.token_grant(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<StravaActivity, AppError> {
        let url = format!("{}/activities/{}", self.api_url, activity_id);

        let response = self.http.get(&url).bearer_auth(access_token).send().await?;

        check_response_json(response).await
    }

    /// List the athlete's activities started after `after` (unix seconds).
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>, AppError> {
        let url = format!("{}/athlete/activities", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("after", after.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await?;

        check_response_json(response).await
    }

    /// Update an activity's description.
    pub async fn update_activity_description(
        &self,
        access_token: &str,
        activity_id: u64,
        description: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/activities/{}", self.api_url, activity_id);

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .form(&[("description", description)])
            .send()
            .await?;

        check_response(response).await
    }

    async fn token_grant(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Strava token grant rejected");
            return Err(AppError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse token response: {}", e)))
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(upstream_error(response).await)
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)))
}

async fn upstream_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 429 {
        tracing::warn!("Strava rate limit hit (429)");
    }

    AppError::Upstream(format!("HTTP {}: {}", status, body))
}

/// Token grant response from Strava.
///
/// The code grant also carries an `athlete` object, which we ignore.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl From<TokenResponse> for TokenState {
    fn from(resp: TokenResponse) -> Self {
        Self {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            expires_at: resp.expires_at,
        }
    }
}

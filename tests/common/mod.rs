// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use strava_totals::config::Config;
use strava_totals::routes::create_router;
use strava_totals::services::StravaClient;
use strava_totals::AppState;
use wiremock::{MockServer, Request, ResponseTemplate};

/// Access token seeded into test configs (valid for an hour).
#[allow(dead_code)]
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

#[allow(dead_code)]
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Config pointing every Strava URL at the mock server, with a fresh
/// access token and no retry delay.
#[allow(dead_code)]
pub fn test_config(server: &MockServer, cache_dir: &Path) -> Config {
    Config {
        refresh_token: Some("seed_refresh".to_string()),
        access_token: Some(TEST_ACCESS_TOKEN.to_string()),
        token_expires_at: now() + 3600,
        token_cache_path: cache_dir.join("tokens.json"),
        strava_api_url: format!("{}/api/v3", server.uri()),
        strava_oauth_url: format!("{}/oauth", server.uri()),
        http_timeout: Duration::from_secs(5),
        update_retry_delay: Duration::ZERO,
        ..Config::default()
    }
}

/// Create a test app from a config.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config).expect("Failed to build app state"));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn test_client(server: &MockServer, timeout: Duration) -> StravaClient {
    StravaClient::new(
        "test_client_id".to_string(),
        "test_secret".to_string(),
        format!("{}/api/v3", server.uri()),
        format!("{}/oauth", server.uri()),
        timeout,
    )
    .expect("Failed to build Strava client")
}

/// Successful token grant body, as Strava sends it.
#[allow(dead_code)]
pub fn token_response(access: &str, refresh: &str, expires_at: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "token_type": "Bearer",
        "access_token": access,
        "refresh_token": refresh,
        "expires_at": expires_at,
        "expires_in": 21600
    }))
}

/// The two activities from the canonical totals example: 3.50 km, 0h 25m, 15.5 m.
#[allow(dead_code)]
pub fn two_runs() -> serde_json::Value {
    json!([
        {"id": 1, "type": "Run", "sport_type": "Run", "distance": 1000.0,
         "moving_time": 600, "total_elevation_gain": 10.0},
        {"id": 2, "type": "Run", "sport_type": "Run", "distance": 2500.0,
         "moving_time": 900, "total_elevation_gain": 5.5}
    ])
}

/// Decode the `description` field of a form-encoded PUT body.
#[allow(dead_code)]
pub fn form_description(request: &Request) -> String {
    let body = String::from_utf8_lossy(&request.body);
    let raw = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("description="))
        .expect("PUT body has no description");
    urlencoding::decode(&raw.replace('+', " "))
        .expect("description is not valid UTF-8")
        .into_owned()
}

/// Requests received so far with the given method.
#[allow(dead_code)]
pub async fn requests_with_method(server: &MockServer, method: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == method)
        .collect()
}

/// Poll until a request with `method` arrives, or panic after `timeout`.
#[allow(dead_code)]
pub async fn wait_for_request(server: &MockServer, method: &str, timeout: Duration) -> Request {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(request) = requests_with_method(server, method).await.into_iter().next() {
            return request;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("no {} request within {:?}", method, timeout);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Token variables accept both the bare name (`REFRESH_TOKEN`) and the
//! `STRAVA_`-prefixed spelling; the bare name wins when both are set.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the token cache file.
pub const DEFAULT_TOKEN_CACHE_PATH: &str = "latest_tokens.json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Strava app credentials ---
    /// Strava OAuth client ID
    pub client_id: String,
    /// Strava OAuth client secret
    pub client_secret: String,
    /// Shared secret for the webhook subscription handshake
    pub verify_token: String,

    // --- Token seed ---
    /// Refresh token to seed the token store with
    pub refresh_token: Option<String>,
    /// Pre-seeded access token (optional)
    pub access_token: Option<String>,
    /// Expiry of the pre-seeded access token (unix seconds)
    pub token_expires_at: i64,
    /// Where refreshed tokens are cached between restarts
    pub token_cache_path: PathBuf,

    // --- Server ---
    pub port: u16,
    /// OAuth callback URL; derived from the request Host header when unset
    pub redirect_uri: Option<String>,

    // --- Strava API ---
    pub strava_api_url: String,
    pub strava_oauth_url: String,
    /// Timeout applied to every outbound call
    pub http_timeout: Duration,

    // --- Activity updates ---
    /// Only count run-type activities in the totals
    pub runs_only: bool,
    pub update_max_attempts: u32,
    pub update_retry_delay: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            verify_token: "test_verify_token".to_string(),
            refresh_token: Some("test_refresh_token".to_string()),
            access_token: None,
            token_expires_at: 0,
            token_cache_path: PathBuf::from(DEFAULT_TOKEN_CACHE_PATH),
            port: 8080,
            redirect_uri: None,
            strava_api_url: "https://www.strava.com/api/v3".to_string(),
            strava_oauth_url: "https://www.strava.com/oauth".to_string(),
            http_timeout: Duration::from_secs(15),
            runs_only: false,
            update_max_attempts: 3,
            update_retry_delay: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            client_id: required(&["CLIENT_ID", "STRAVA_CLIENT_ID"])?,
            client_secret: required(&["CLIENT_SECRET", "STRAVA_CLIENT_SECRET"])?,
            verify_token: required(&["VERIFY_TOKEN", "STRAVA_VERIFY_TOKEN"])?,

            refresh_token: optional(&["REFRESH_TOKEN", "STRAVA_REFRESH_TOKEN"]),
            access_token: optional(&["ACCESS_TOKEN", "STRAVA_ACCESS_TOKEN"]),
            token_expires_at: parsed(&["TOKEN_EXPIRES_AT", "STRAVA_TOKEN_EXPIRES_AT"], 0)?,
            token_cache_path: optional(&["TOKEN_CACHE_PATH"])
                .map(PathBuf::from)
                .unwrap_or(defaults.token_cache_path),

            port: parsed(&["PORT"], defaults.port)?,
            redirect_uri: optional(&["REDIRECT_URI"]),

            strava_api_url: optional(&["STRAVA_API_URL"]).unwrap_or(defaults.strava_api_url),
            strava_oauth_url: optional(&["STRAVA_OAUTH_URL"])
                .unwrap_or(defaults.strava_oauth_url),
            http_timeout: Duration::from_secs(parsed(&["HTTP_TIMEOUT_SECS"], 15)?),

            runs_only: parse_bool("RUNS_ONLY")?.unwrap_or(defaults.runs_only),
            update_max_attempts: parsed(&["UPDATE_MAX_ATTEMPTS"], defaults.update_max_attempts)?,
            update_retry_delay: Duration::from_secs(parsed(&["UPDATE_RETRY_DELAY_SECS"], 5)?),
        })
    }
}

/// First non-empty value among `names`, trimmed.
fn optional(names: &[&'static str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn required(names: &[&'static str]) -> Result<String, ConfigError> {
    optional(names).ok_or(ConfigError::Missing(names[0]))
}

fn parsed<T: std::str::FromStr>(names: &[&'static str], default: T) -> Result<T, ConfigError> {
    match optional(names) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(names[0])),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = optional(&[name]) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid(name)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Owner of the single OAuth token triple.
//!
//! The store hands out access tokens that stay valid for at least
//! [`TOKEN_REFRESH_MARGIN_SECS`], refreshing on demand. Refreshes are
//! serialized: callers that arrive while one is in flight wait for it and
//! reuse its result instead of issuing their own.
//!
//! Every successful refresh is written to a local cache file so a restart
//! can pick up a rotated refresh token. The file is advisory; write
//! failures are logged and otherwise ignored.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::token::TOKEN_REFRESH_MARGIN_SECS;
use crate::models::TokenState;
use crate::services::StravaClient;
use crate::time_utils::{format_unix, now_unix};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};

pub struct TokenStore {
    client: StravaClient,
    state: RwLock<Option<TokenState>>,
    /// Held for the whole refresh-and-persist sequence. Holds the error of
    /// the last attempt if it failed.
    refresh_gate: Mutex<Option<AppError>>,
    /// Number of finished refresh attempts. Only bumped with the gate held.
    refresh_generation: AtomicU64,
    cache_path: Option<PathBuf>,
}

impl TokenStore {
    pub fn new(client: StravaClient, seed: Option<TokenState>, cache_path: Option<PathBuf>) -> Self {
        Self {
            client,
            state: RwLock::new(seed),
            refresh_gate: Mutex::new(None),
            refresh_generation: AtomicU64::new(0),
            cache_path,
        }
    }

    /// Build the store from startup configuration.
    ///
    /// A refresh token from the environment wins over the cache file; the
    /// cache is only consulted when the environment carries none.
    pub fn from_config(config: &Config, client: StravaClient) -> Self {
        let from_env = || TokenState {
            access_token: config.access_token.clone().unwrap_or_default(),
            refresh_token: config.refresh_token.clone().unwrap_or_default(),
            expires_at: config.token_expires_at,
        };

        let seed = if config.refresh_token.is_some() {
            tracing::info!("Seeding token store from environment");
            Some(from_env())
        } else if let Some(cached) = load_cache(&config.token_cache_path) {
            tracing::info!(
                path = %config.token_cache_path.display(),
                valid_until = %format_unix(cached.expires_at),
                "Seeding token store from cache file"
            );
            Some(cached)
        } else if config.access_token.is_some() {
            tracing::warn!("No refresh token configured; access token cannot be renewed");
            Some(from_env())
        } else {
            tracing::warn!("Token store starts empty; authorize via /auth/strava");
            None
        };

        Self::new(client, seed, Some(config.token_cache_path.clone()))
    }

    /// Get an access token that stays valid for at least the refresh margin.
    ///
    /// 1. Fast path: read lock, return the cached token if fresh
    /// 2. Acquire the refresh gate (waits for any in-flight refresh)
    /// 3. Re-check; another task may have refreshed while we waited
    /// 4. If an attempt finished while we waited and failed, return its error
    /// 5. Refresh with Strava and persist
    pub async fn get_valid_token(&self) -> Result<String> {
        if let Some(token) = self.fresh_access_token().await {
            return Ok(token);
        }

        let seen = self.refresh_generation.load(Ordering::Acquire);
        let mut last_failure = self.refresh_gate.lock().await;

        if let Some(token) = self.fresh_access_token().await {
            return Ok(token);
        }

        if self.refresh_generation.load(Ordering::Acquire) != seen {
            if let Some(err) = last_failure.as_ref() {
                tracing::debug!(error = %err, "Reusing failure of concurrent token refresh");
                return Err(replay(err));
            }
        }

        tracing::info!("Access token missing or expiring, refreshing");
        let state = self.refresh_recorded(&mut last_failure).await?;
        Ok(state.access_token)
    }

    /// Unconditionally run the refresh grant with the stored refresh token.
    pub async fn refresh(&self) -> Result<TokenState> {
        let mut last_failure = self.refresh_gate.lock().await;
        self.refresh_recorded(&mut last_failure).await
    }

    /// Replace the whole token triple, e.g. after an authorization-code grant.
    pub async fn install(&self, state: TokenState) {
        let mut last_failure = self.refresh_gate.lock().await;
        tracing::info!(valid_until = %format_unix(state.expires_at), "Installing new tokens");
        *self.state.write().await = Some(state.clone());
        self.persist(&state).await;
        *last_failure = None;
        self.refresh_generation.fetch_add(1, Ordering::Release);
    }

    /// Copy of the current token triple, if any.
    pub async fn snapshot(&self) -> Option<TokenState> {
        self.state.read().await.clone()
    }

    async fn fresh_access_token(&self) -> Option<String> {
        let now = now_unix();
        self.state
            .read()
            .await
            .as_ref()
            .filter(|s| s.is_fresh_at(now))
            .map(|s| s.access_token.clone())
    }

    /// Run one refresh attempt and publish its outcome to waiting callers.
    /// `last_failure` is the guarded contents of `refresh_gate`.
    async fn refresh_recorded(&self, last_failure: &mut Option<AppError>) -> Result<TokenState> {
        let result = self.refresh_locked().await;
        *last_failure = result.as_ref().err().map(replay);
        self.refresh_generation.fetch_add(1, Ordering::Release);
        result
    }

    /// Caller must hold `refresh_gate`.
    async fn refresh_locked(&self) -> Result<TokenState> {
        let refresh_token = self
            .state
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .filter(|t| !t.is_empty())
            .ok_or(AppError::MissingRefreshToken)?;

        let new_state: TokenState = self.client.refresh_token(&refresh_token).await?.into();

        tracing::info!(
            valid_until = %format_unix(new_state.expires_at),
            refresh_token_rotated = new_state.refresh_token != refresh_token,
            margin_secs = TOKEN_REFRESH_MARGIN_SECS,
            "Tokens refreshed"
        );

        *self.state.write().await = Some(new_state.clone());
        self.persist(&new_state).await;

        Ok(new_state)
    }

    async fn persist(&self, state: &TokenState) {
        let Some(path) = &self.cache_path else {
            return;
        };

        match write_cache(path, state).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Saved tokens to cache file"),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Could not save tokens to cache file"
            ),
        }
    }
}

/// Copy of a refresh error, handed to each caller that waited on the attempt.
fn replay(err: &AppError) -> AppError {
    match err {
        AppError::Auth { status, body } => AppError::Auth {
            status: *status,
            body: body.clone(),
        },
        AppError::MissingRefreshToken => AppError::MissingRefreshToken,
        AppError::Upstream(msg) => AppError::Upstream(msg.clone()),
        other => AppError::Internal(anyhow::anyhow!("{}", other)),
    }
}

async fn write_cache(path: &Path, state: &TokenState) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(state)?;
    tokio::fs::write(path, json).await?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }

    Ok(())
}

/// Read the token cache file. Missing or unreadable files yield `None`.
pub fn load_cache(path: &Path) -> Option<TokenState> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read token cache file");
            return None;
        }
    };

    match serde_json::from_str(&json) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed token cache file");
            None
        }
    }
}

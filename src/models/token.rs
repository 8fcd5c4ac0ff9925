// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth token triple held by the token store.

use serde::{Deserialize, Serialize};

/// Margin before token expiration when we proactively refresh (5 minutes).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Access token, refresh token and access token expiry.
///
/// Also the on-disk format of the token cache file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
}

impl TokenState {
    /// A state holding only a refresh token; the first use forces a refresh.
    pub fn from_refresh_token(refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: String::new(),
            refresh_token: refresh_token.into(),
            expires_at: 0,
        }
    }

    /// Whether the access token is present and stays valid past the refresh margin.
    pub fn is_fresh_at(&self, now: i64) -> bool {
        !self.access_token.is_empty() && now + TOKEN_REFRESH_MARGIN_SECS < self.expires_at
    }
}

// Tokens are credentials; keep them out of `{:?}` output.
impl std::fmt::Debug for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Current time as unix seconds.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Unix timestamp `days` before `now`.
pub fn days_before(now: DateTime<Utc>, days: i64) -> i64 {
    (now - Duration::days(days)).timestamp()
}

/// Format unix seconds as RFC3339 using a `Z` suffix, for logs.
pub fn format_unix(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| ts.to_string())
}

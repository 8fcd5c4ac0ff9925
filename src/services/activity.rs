// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity update service.
//!
//! Handles the core workflow for a newly created activity:
//! 1. Get a valid access token
//! 2. Fetch the activity from Strava (skip if already annotated)
//! 3. List the trailing 7 days of activities and sum them
//! 4. Append the totals block to the description

use crate::config::Config;
use crate::error::Result;
use crate::models::totals::{
    append_totals_block, has_totals_block, ACTIVITIES_PER_PAGE, ROLLING_WINDOW_DAYS,
};
use crate::models::{ActivityFilter, ActivitySummary};
use crate::services::{StravaClient, TokenStore};
use crate::time_utils::days_before;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Filter and retry settings for activity updates.
#[derive(Debug, Clone)]
pub struct UpdatePolicy {
    pub filter: ActivityFilter,
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            filter: ActivityFilter::All,
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl UpdatePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            filter: ActivityFilter::from_runs_only(config.runs_only),
            max_attempts: config.update_max_attempts,
            retry_delay: config.update_retry_delay,
        }
    }
}

/// What a single successful attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    AlreadyAnnotated,
}

/// Appends rolling totals to new activities.
#[derive(Clone)]
pub struct ActivityUpdater {
    strava: StravaClient,
    tokens: Arc<TokenStore>,
    policy: UpdatePolicy,
}

impl ActivityUpdater {
    pub fn new(strava: StravaClient, tokens: Arc<TokenStore>, policy: UpdatePolicy) -> Self {
        Self {
            strava,
            tokens,
            policy,
        }
    }

    /// Annotate a new activity, retrying transient failures.
    ///
    /// Never returns an error: failures are logged and reported as `false`.
    pub async fn handle_new_activity(&self, activity_id: u64) -> bool {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.update_once(activity_id).await {
                Ok(outcome) => {
                    tracing::info!(activity_id, attempt, outcome = ?outcome, "Activity update finished");
                    return true;
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        activity_id,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Activity update failed, retrying"
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        activity_id,
                        attempt,
                        error = %e,
                        "Activity update failed, giving up"
                    );
                    return false;
                }
            }
        }

        false
    }

    /// Run `handle_new_activity` as a detached task.
    pub fn spawn_update(&self, activity_id: u64) -> JoinHandle<bool> {
        let updater = self.clone();
        tokio::spawn(
            async move { updater.handle_new_activity(activity_id).await }
                .instrument(tracing::info_span!("activity_update", activity_id)),
        )
    }

    /// One pass of read, list and write, with no retries.
    pub async fn update_once(&self, activity_id: u64) -> Result<UpdateOutcome> {
        let token = self.tokens.get_valid_token().await?;

        let activity = self.strava.get_activity(&token, activity_id).await?;
        if activity.description.as_deref().is_some_and(has_totals_block) {
            tracing::debug!(activity_id, "Activity already annotated (idempotent skip)");
            return Ok(UpdateOutcome::AlreadyAnnotated);
        }

        let summary = self.summarize(&token).await?;
        let description =
            append_totals_block(activity.description.as_deref(), &summary.totals_block());

        self.strava
            .update_activity_description(&token, activity_id, &description)
            .await?;

        tracing::info!(
            activity_id,
            activities = summary.activity_count,
            distance_km = summary.distance_km(),
            "Appended rolling totals"
        );
        Ok(UpdateOutcome::Updated)
    }

    /// Totals over the trailing window, as of now.
    pub async fn rolling_totals(&self) -> Result<ActivitySummary> {
        let token = self.tokens.get_valid_token().await?;
        self.summarize(&token).await
    }

    async fn summarize(&self, token: &str) -> Result<ActivitySummary> {
        let after = days_before(chrono::Utc::now(), ROLLING_WINDOW_DAYS);
        let activities = self
            .strava
            .list_activities(token, after, ACTIVITIES_PER_PAGE)
            .await?;

        Ok(ActivitySummary::from_activities(
            &activities,
            self.policy.filter,
        ))
    }
}

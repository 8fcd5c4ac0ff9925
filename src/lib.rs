// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Totals: append 7-day rolling totals to new Strava activities
//!
//! This crate receives Strava webhook events, and for every newly created
//! activity sums the athlete's last seven days of distance, moving time and
//! elevation gain into the activity's description.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use error::AppError;
use services::{ActivityUpdater, StravaClient, TokenStore, UpdatePolicy};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaClient,
    pub tokens: Arc<TokenStore>,
    pub updater: ActivityUpdater,
}

impl AppState {
    /// Wire up the Strava client, token store and updater from config.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let strava = StravaClient::from_config(&config)?;
        let tokens = Arc::new(TokenStore::from_config(&config, strava.clone()));
        let updater = ActivityUpdater::new(
            strava.clone(),
            tokens.clone(),
            UpdatePolicy::from_config(&config),
        );

        Ok(Self {
            config,
            strava,
            tokens,
            updater,
        })
    }
}

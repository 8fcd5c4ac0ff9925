// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod strava;
pub mod token_store;

pub use activity::{ActivityUpdater, UpdateOutcome, UpdatePolicy};
pub use strava::StravaClient;
pub use token_store::TokenStore;

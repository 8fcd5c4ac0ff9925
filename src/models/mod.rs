// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod token;
pub mod totals;

pub use activity::{ActivityEvent, AspectType, ObjectType, StravaActivity, StravaActivitySummary};
pub use token::TokenState;
pub use totals::{ActivityFilter, ActivitySummary};

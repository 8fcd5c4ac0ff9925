// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Current rolling totals as JSON.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::ActivitySummary;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/totals", get(get_totals))
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    #[serde(rename = "7_day_total_distance_km")]
    pub distance_km: f64,
    #[serde(rename = "7_day_total_moving_time_min")]
    pub moving_time_min: f64,
    #[serde(rename = "7_day_total_elevation_gain_m")]
    pub elevation_gain_m: f64,
    pub activity_count: u32,
}

impl From<ActivitySummary> for TotalsResponse {
    fn from(summary: ActivitySummary) -> Self {
        Self {
            distance_km: summary.distance_km(),
            moving_time_min: summary.moving_time_min(),
            elevation_gain_m: (summary.elevation_gain_m * 100.0).round() / 100.0,
            activity_count: summary.activity_count,
        }
    }
}

async fn get_totals(State(state): State<Arc<AppState>>) -> Result<Json<TotalsResponse>> {
    let summary = state.updater.rolling_totals().await?;
    Ok(Json(summary.into()))
}

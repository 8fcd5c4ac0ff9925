// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Rolling totals over a trailing window of activities, and the
//! description block that carries them.

use serde::Serialize;

use crate::models::StravaActivitySummary;

/// Marks a description as already annotated. Used for detection, stripping
/// and rendering.
pub const TOTALS_MARKER: &str = "7-day rolling totals:";

/// Length of the trailing window.
pub const ROLLING_WINDOW_DAYS: i64 = 7;

/// Page size for the activity list (Strava's maximum).
pub const ACTIVITIES_PER_PAGE: u32 = 200;

/// Sport types counted when only runs are wanted.
pub const RUN_SPORT_TYPES: &[&str] = &["Run", "TrailRun", "VirtualRun"];

/// Which activities contribute to the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityFilter {
    #[default]
    All,
    RunsOnly,
}

impl ActivityFilter {
    pub fn from_runs_only(runs_only: bool) -> Self {
        if runs_only {
            Self::RunsOnly
        } else {
            Self::All
        }
    }

    pub fn matches(&self, activity: &StravaActivitySummary) -> bool {
        match self {
            Self::All => true,
            Self::RunsOnly => activity
                .kind()
                .is_some_and(|kind| RUN_SPORT_TYPES.contains(&kind)),
        }
    }
}

/// Aggregated distance, moving time and elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ActivitySummary {
    pub activity_count: u32,
    pub distance_m: f64,
    pub moving_time_s: u64,
    pub elevation_gain_m: f64,
}

impl ActivitySummary {
    pub fn from_activities(activities: &[StravaActivitySummary], filter: ActivityFilter) -> Self {
        activities
            .iter()
            .filter(|a| filter.matches(a))
            .fold(Self::default(), |mut acc, a| {
                acc.activity_count += 1;
                acc.distance_m += a.distance;
                acc.moving_time_s += a.moving_time;
                acc.elevation_gain_m += a.total_elevation_gain;
                acc
            })
    }

    /// Kilometers, rounded to 2 decimals.
    pub fn distance_km(&self) -> f64 {
        round_to(self.distance_m / 1000.0, 2)
    }

    /// Whole hours and leftover whole minutes.
    pub fn hours_minutes(&self) -> (u64, u64) {
        let hours = self.moving_time_s / 3600;
        let minutes = (self.moving_time_s % 3600) / 60;
        (hours, minutes)
    }

    /// Moving time in minutes, rounded to 2 decimals.
    pub fn moving_time_min(&self) -> f64 {
        round_to(self.moving_time_s as f64 / 60.0, 2)
    }

    /// Meters, rounded to 1 decimal.
    pub fn elevation_m(&self) -> f64 {
        round_to(self.elevation_gain_m, 1)
    }

    /// Render the block appended to activity descriptions.
    pub fn totals_block(&self) -> String {
        let (hours, minutes) = self.hours_minutes();
        format!(
            "{}\n🏃 {:.2} km\n⏱️ {}h {}m\n⛰️ {:.1} m",
            TOTALS_MARKER,
            self.distance_m / 1000.0,
            hours,
            minutes,
            self.elevation_gain_m
        )
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Whether a description already carries a totals block.
pub fn has_totals_block(description: &str) -> bool {
    description.contains(TOTALS_MARKER)
}

/// Description with any totals block (and everything after it) removed.
pub fn strip_totals_block(description: &str) -> &str {
    match description.find(TOTALS_MARKER) {
        Some(idx) => description[..idx].trim_end(),
        None => description.trim_end(),
    }
}

/// Append a totals block to a description, replacing any stale one.
pub fn append_totals_block(description: Option<&str>, block: &str) -> String {
    let base = strip_totals_block(description.unwrap_or_default());
    if base.is_empty() {
        block.to_string()
    } else {
        format!("{}\n\n{}", base, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(kind: &str, distance: f64, moving_time: u64, elevation: f64) -> StravaActivitySummary {
        StravaActivitySummary {
            distance,
            moving_time,
            total_elevation_gain: elevation,
            sport_type: Some(kind.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_sum_two_activities() {
        let activities = vec![
            activity("Run", 1000.0, 600, 10.0),
            activity("Run", 2500.0, 900, 5.5),
        ];

        let summary = ActivitySummary::from_activities(&activities, ActivityFilter::All);

        assert_eq!(summary.activity_count, 2);
        assert_eq!(summary.distance_km(), 3.5);
        assert_eq!(summary.hours_minutes(), (0, 25));
        assert_eq!(summary.elevation_m(), 15.5);
        assert_eq!(
            summary.totals_block(),
            "7-day rolling totals:\n🏃 3.50 km\n⏱️ 0h 25m\n⛰️ 15.5 m"
        );
    }

    #[test]
    fn test_empty_list() {
        let summary = ActivitySummary::from_activities(&[], ActivityFilter::All);
        assert_eq!(summary, ActivitySummary::default());
        assert_eq!(
            summary.totals_block(),
            "7-day rolling totals:\n🏃 0.00 km\n⏱️ 0h 0m\n⛰️ 0.0 m"
        );
    }

    #[test]
    fn test_hours_and_minutes_truncate() {
        let summary = ActivitySummary {
            moving_time_s: 2 * 3600 + 59 * 60 + 59,
            ..Default::default()
        };
        assert_eq!(summary.hours_minutes(), (2, 59));
        assert_eq!(summary.moving_time_min(), 179.98);
    }

    #[test]
    fn test_runs_only_filter() {
        let activities = vec![
            activity("Run", 5000.0, 1500, 20.0),
            activity("Ride", 40000.0, 5400, 300.0),
            activity("TrailRun", 8000.0, 3000, 250.0),
        ];

        let summary = ActivitySummary::from_activities(&activities, ActivityFilter::RunsOnly);

        assert_eq!(summary.activity_count, 2);
        assert_eq!(summary.distance_km(), 13.0);
        assert_eq!(summary.elevation_m(), 270.0);
    }

    #[test]
    fn test_runs_only_falls_back_to_legacy_type() {
        let legacy = StravaActivitySummary {
            activity_type: Some("Run".to_string()),
            distance: 1000.0,
            ..Default::default()
        };
        let untyped = StravaActivitySummary {
            distance: 1000.0,
            ..Default::default()
        };

        let summary = ActivitySummary::from_activities(&[legacy, untyped], ActivityFilter::RunsOnly);
        assert_eq!(summary.activity_count, 1);
    }

    #[test]
    fn test_append_to_none_and_empty() {
        assert_eq!(append_totals_block(None, "BLOCK"), "BLOCK");
        assert_eq!(append_totals_block(Some(""), "BLOCK"), "BLOCK");
        assert_eq!(append_totals_block(Some("  \n"), "BLOCK"), "BLOCK");
    }

    #[test]
    fn test_append_to_existing_description() {
        assert_eq!(
            append_totals_block(Some("Easy shakeout\nLegs felt good."), "BLOCK"),
            "Easy shakeout\nLegs felt good.\n\nBLOCK"
        );
    }

    #[test]
    fn test_append_replaces_stale_block() {
        let stale = "Tempo run\n\n7-day rolling totals:\n🏃 1.00 km\n⏱️ 0h 5m\n⛰️ 0.0 m";
        assert_eq!(append_totals_block(Some(stale), "BLOCK"), "Tempo run\n\nBLOCK");
    }

    #[test]
    fn test_marker_detection_uses_rendered_block() {
        let block = ActivitySummary::default().totals_block();
        let annotated = append_totals_block(Some("Long run"), &block);

        assert!(has_totals_block(&annotated));
        assert!(!has_totals_block("Long run"));
        assert_eq!(strip_totals_block(&annotated), "Long run");
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity shapes and the webhook event payload.

use serde::Deserialize;
use std::collections::HashMap;

/// Kind of object a webhook event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Activity,
    Athlete,
    #[serde(other)]
    Other,
}

/// What happened to the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectType {
    Create,
    Update,
    Delete,
    #[serde(other)]
    Other,
}

/// Strava webhook event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEvent {
    pub object_type: ObjectType,
    pub aspect_type: AspectType,
    pub object_id: u64,
    pub owner_id: u64,
    #[serde(default)]
    pub subscription_id: Option<u64>,
    #[serde(default)]
    pub event_time: Option<i64>,
    /// Changed fields for update events, e.g. {"title": "..."}
    #[serde(default)]
    pub updates: Option<HashMap<String, serde_json::Value>>,
}

impl ActivityEvent {
    /// Only newly created activities get a totals block.
    pub fn is_activity_create(&self) -> bool {
        self.object_type == ObjectType::Activity && self.aspect_type == AspectType::Create
    }
}

/// Detailed Strava activity response (only the fields we touch).
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivity {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Summary activity from `GET /athlete/activities`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StravaActivitySummary {
    #[serde(default)]
    pub id: u64,
    /// Meters
    #[serde(default)]
    pub distance: f64,
    /// Seconds
    #[serde(default)]
    pub moving_time: u64,
    /// Meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Legacy activity type ("Run", "Ride", ...)
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub sport_type: Option<String>,
}

impl StravaActivitySummary {
    /// Sport type, falling back to the legacy `type` field.
    pub fn kind(&self) -> Option<&str> {
        self.sport_type
            .as_deref()
            .or(self.activity_type.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_create_event() {
        let event: ActivityEvent = serde_json::from_value(json!({
            "aspect_type": "create",
            "event_time": 1516126040,
            "object_id": 1360128428_u64,
            "object_type": "activity",
            "owner_id": 134815,
            "subscription_id": 120475,
            "updates": {}
        }))
        .unwrap();

        assert!(event.is_activity_create());
        assert_eq!(event.object_id, 1360128428);
        assert_eq!(event.owner_id, 134815);
    }

    #[test]
    fn test_unknown_types_parse_as_other() {
        let event: ActivityEvent = serde_json::from_value(json!({
            "aspect_type": "deauthorize",
            "object_id": 1,
            "object_type": "club",
            "owner_id": 2
        }))
        .unwrap();

        assert_eq!(event.object_type, ObjectType::Other);
        assert_eq!(event.aspect_type, AspectType::Other);
        assert!(!event.is_activity_create());
    }

    #[test]
    fn test_athlete_update_is_not_activity_create() {
        let event: ActivityEvent = serde_json::from_value(json!({
            "aspect_type": "update",
            "object_id": 134815,
            "object_type": "athlete",
            "owner_id": 134815,
            "updates": {"authorized": "false"}
        }))
        .unwrap();

        assert_eq!(event.object_type, ObjectType::Athlete);
        assert!(!event.is_activity_create());
    }

    #[test]
    fn test_summary_missing_fields_default_to_zero() {
        let summary: StravaActivitySummary =
            serde_json::from_value(json!({"id": 5, "type": "Ride"})).unwrap();

        assert_eq!(summary.distance, 0.0);
        assert_eq!(summary.moving_time, 0);
        assert_eq!(summary.kind(), Some("Ride"));
    }

    #[test]
    fn test_kind_prefers_sport_type() {
        let summary: StravaActivitySummary =
            serde_json::from_value(json!({"type": "Run", "sport_type": "TrailRun"})).unwrap();
        assert_eq!(summary.kind(), Some("TrailRun"));
    }
}

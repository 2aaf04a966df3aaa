//! Task model and the read-only task source seam.
//!
//! The engine never owns or mutates tasks. The external task store (CRUD,
//! persistence, UI) implements [`TaskSource`] and signals the engine via
//! `EngineHandle::tasks_changed` whenever its collection changes. Types here
//! mirror the store's persisted records so they round-trip through serde
//! unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;

/// A task with an optional geofence attached.
///
/// Owned by the external task store; the engine only reads it. A task is
/// matchable by the evaluator only when it is not completed, has a
/// location, and has a positive radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceTask {
    /// Unique task id, assigned by the store.
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// Optional free-text description (empty string when absent).
    #[serde(default)]
    pub description: String,
    /// Optional due date, ISO 8601 string as persisted by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Geofence center. Tasks without a location are never evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    /// Geofence radius in meters.
    pub radius: f64,
    /// Completed tasks are skipped by the evaluator.
    pub is_completed: bool,
    /// Creation time in milliseconds since the epoch, as stored.
    #[serde(default)]
    pub created_at: i64,
}

impl GeofenceTask {
    /// Whether this task currently has an evaluable geofence.
    pub fn has_active_fence(&self) -> bool {
        !self.is_completed && self.location.is_some() && self.radius > 0.0
    }
}

/// Read-only accessor for the current task list.
///
/// Injected into the engine so unit tests can supply synthetic task lists
/// and the production host can back it with its persisted collection.
/// `snapshot` is called once per evaluation pass; implementations should
/// return a cheap clone of the current state.
pub trait TaskSource: Send + Sync + 'static {
    /// Current tasks, in no particular order.
    fn snapshot(&self) -> Vec<GeofenceTask>;
}

/// A fence entry detected by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceEvent {
    /// Id of the task whose fence was entered.
    pub task_id: String,
    /// Distance from the user to the fence center at detection, meters.
    pub distance: f64,
    /// Wall-clock time of detection.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_task() -> GeofenceTask {
        GeofenceTask {
            id: "t1".to_string(),
            title: "Pharmacy".to_string(),
            description: "Buy meds".to_string(),
            due_date: None,
            location: Some(Coordinate::new(40.7128, -74.0060)),
            radius: 200.0,
            is_completed: false,
            created_at: 0,
        }
    }

    #[test]
    fn test_active_fence() {
        assert!(base_task().has_active_fence());
    }

    #[test]
    fn test_completed_task_has_no_active_fence() {
        let task = GeofenceTask {
            is_completed: true,
            ..base_task()
        };
        assert!(!task.has_active_fence());
    }

    #[test]
    fn test_task_without_location_has_no_active_fence() {
        let task = GeofenceTask {
            location: None,
            ..base_task()
        };
        assert!(!task.has_active_fence());
    }

    #[test]
    fn test_zero_radius_has_no_active_fence() {
        let task = GeofenceTask {
            radius: 0.0,
            ..base_task()
        };
        assert!(!task.has_active_fence());
    }

    #[test]
    fn test_task_roundtrips_through_json() {
        let task = base_task();
        let json = serde_json::to_string(&task).unwrap();
        let back: GeofenceTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, task.id);
        assert_eq!(back.location.unwrap(), task.location.unwrap());
        assert_eq!(back.radius, task.radius);
    }

    #[test]
    fn test_task_parses_store_record_without_optionals() {
        // The store may omit description/dueDate/location entirely.
        let json = r#"{
            "id": "t2",
            "title": "Call home",
            "radius": 200.0,
            "is_completed": false
        }"#;
        let task: GeofenceTask = serde_json::from_str(json).unwrap();
        assert!(task.location.is_none());
        assert!(!task.has_active_fence());
    }
}

//! Geofence evaluation and one-shot trigger deduplication.
//!
//! On every accepted position update (and every task-list change) the
//! evaluator scans the active tasks, computes the haversine distance to
//! each fence center, and reports the fences entered for the first time.
//! The triggered set is monotonic and session-scoped: it lives in memory,
//! grows as fences fire, and is only cleared by process restart. A task
//! that re-arms (marked incomplete after triggering) stays silent unless
//! external logic calls [`GeofenceEvaluator::reset`].

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::coord::{distance, Coordinate};
use crate::task::{GeofenceEvent, GeofenceTask};

/// Scans tasks against a position and fires each fence at most once.
#[derive(Debug, Default)]
pub struct GeofenceEvaluator {
    /// Ids of tasks already notified this session.
    triggered: HashSet<String>,
}

impl GeofenceEvaluator {
    /// Create an evaluator with an empty triggered set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one evaluation pass.
    ///
    /// Returns an event for every task whose fence the position is inside
    /// and that has not fired before; each returned task id is recorded in
    /// the triggered set in the same pass, so re-running with identical
    /// inputs yields nothing. Tasks are independent; their order in the
    /// input does not affect the outcome.
    pub fn evaluate(&mut self, position: Coordinate, tasks: &[GeofenceTask]) -> Vec<GeofenceEvent> {
        let mut events = Vec::new();

        for task in tasks {
            if !task.has_active_fence() || self.triggered.contains(&task.id) {
                continue;
            }
            // has_active_fence guarantees the location is present.
            let Some(center) = task.location else { continue };

            let d = distance(position, center);
            debug!(task_id = %task.id, distance_m = d, radius_m = task.radius, "fence check");

            if d <= task.radius {
                info!(task_id = %task.id, distance_m = d, "geofence entered");
                self.triggered.insert(task.id.clone());
                events.push(GeofenceEvent {
                    task_id: task.id.clone(),
                    distance: d,
                    timestamp: Utc::now(),
                });
            }
        }

        events
    }

    /// Whether a task has already fired this session.
    pub fn is_triggered(&self, task_id: &str) -> bool {
        self.triggered.contains(task_id)
    }

    /// Re-arm a task so its fence may fire again.
    ///
    /// The engine never calls this; it exists for external task-store
    /// logic that un-completes a task and wants a fresh alert.
    pub fn reset(&mut self, task_id: &str) {
        self.triggered.remove(task_id);
    }

    /// Number of fences fired this session.
    pub fn triggered_count(&self) -> usize {
        self.triggered.len()
    }
}

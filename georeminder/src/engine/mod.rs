//! Engine assembly and lifecycle.
//!
//! [`GeofenceEngine`] wires the location tracker, geofence evaluator, and
//! notification channel into a single event-loop task:
//!
//! ```text
//! LocationProvider ──watch events──► LocationTracker ──accepted samples──┐
//!                                                                        ▼
//! TaskSource ──snapshot per pass──────────────────────────► GeofenceEvaluator
//!                                                                        │ fence entries
//!                                                                        ▼
//!                                    NotificationChannel ──► background / direct path
//! ```
//!
//! The host constructs the engine with injected provider/platform/store
//! seams, spawns [`GeofenceEngine::run`], and interacts through the
//! returned [`EngineHandle`].

mod config;
mod runtime;

pub use config::EngineConfig;
pub use runtime::{EngineCommand, EngineHandle, GeofenceEngine, NOTIFICATION_TITLE};

//! GeoReminder - location-aware reminder engine
//!
//! This library provides the geofencing and notification core for a
//! location-aware task reminder application: it tracks the user's position
//! through an adaptive platform watch, evaluates circular geofences
//! attached to pending tasks, and delivers a one-shot arrival alert the
//! first time each fence is entered.
//!
//! The host application injects three seams and spawns the engine:
//!
//! ```ignore
//! use std::sync::Arc;
//! use georeminder::engine::{EngineConfig, GeofenceEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! let (engine, handle) = GeofenceEngine::new(provider, platform, task_store, EngineConfig::default());
//! let shutdown = CancellationToken::new();
//! tokio::spawn(engine.run(shutdown.clone()));
//!
//! // Read-only observables for the UI
//! let position = handle.position();
//! let error = handle.location_error();
//!
//! // Host signals
//! handle.update_location(40.4168, -3.7038);
//! handle.tasks_changed();
//! ```

pub mod coord;
pub mod engine;
pub mod evaluator;
pub mod location;
pub mod log;
pub mod notify;
pub mod task;

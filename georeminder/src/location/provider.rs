//! The platform location provider seam.
//!
//! [`LocationProvider`] mirrors a watch-based platform API: `watch` opens a
//! continuous subscription that pushes [`WatchEvent`]s into a channel and
//! returns an id; `clear_watch` cancels it. The tracker guarantees at most
//! one live watch and discards events from stale ids, so implementations
//! only need to stop sending *eventually* after `clear_watch`.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::coord::Coordinate;

/// Identifier for an active position watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Subscription parameters for a position watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Request the most precise positioning the platform offers, at a
    /// power cost.
    pub high_accuracy: bool,
    /// How long the provider may take before reporting a timeout error.
    pub timeout: Duration,
    /// Maximum age of a cached fix the provider may deliver.
    pub max_sample_age: Duration,
}

/// A single position fix from the provider.
///
/// Ephemeral: consumed by the tracker and evaluator, never persisted.
/// `captured_at` is monotonic so throttle arithmetic is immune to wall
/// clock adjustments.
#[derive(Debug, Clone, Copy)]
pub struct PositionSample {
    /// Where the fix places the user.
    pub coordinate: Coordinate,
    /// When the fix was captured.
    pub captured_at: Instant,
}

impl PositionSample {
    /// Create a sample captured now.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            captured_at: Instant::now(),
        }
    }

    /// Create a sample with an explicit capture time (for testing).
    pub fn at(coordinate: Coordinate, captured_at: Instant) -> Self {
        Self {
            coordinate,
            captured_at,
        }
    }
}

/// Classification of provider failures, mirroring the platform error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    /// The user denied the location permission. Fatal; no mode fallback.
    PermissionDenied,
    /// The platform could not determine a position.
    PositionUnavailable,
    /// The watch exceeded its configured timeout without a fix.
    Timeout,
}

/// A failure reported by the active watch.
#[derive(Debug, Clone, Error)]
#[error("location provider error ({code:?}): {message}")]
pub struct ProviderError {
    /// Failure classification.
    pub code: ProviderErrorCode,
    /// Provider-supplied detail, for logs only.
    pub message: String,
}

impl ProviderError {
    /// Create a new provider error.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Raised when the platform exposes no location capability at all.
#[derive(Debug, Clone, Error)]
#[error("location is not supported on this platform")]
pub struct CapabilityError;

/// What an active watch can emit.
#[derive(Debug, Clone)]
pub enum WatchEventKind {
    /// A new position fix.
    Sample(PositionSample),
    /// A provider failure. The watch stays open unless cancelled.
    Error(ProviderError),
}

/// An event from a position watch, tagged with its originating watch id so
/// the tracker can discard events from subscriptions it already cancelled.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    /// The watch that produced this event.
    pub watch: WatchId,
    /// The event payload.
    pub kind: WatchEventKind,
}

impl WatchEvent {
    /// A sample event from the given watch.
    pub fn sample(watch: WatchId, sample: PositionSample) -> Self {
        Self {
            watch,
            kind: WatchEventKind::Sample(sample),
        }
    }

    /// An error event from the given watch.
    pub fn error(watch: WatchId, error: ProviderError) -> Self {
        Self {
            watch,
            kind: WatchEventKind::Error(error),
        }
    }
}

/// Continuous position stream from the platform.
///
/// Production hosts adapt their platform's geolocation API; tests use a
/// scripted mock. Implementations must deliver events for a watch in
/// arrival order.
pub trait LocationProvider: Send + Sync + 'static {
    /// Whether the platform exposes a location capability at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Open a continuous position watch.
    ///
    /// Events are pushed into `events`; the returned id tags them. Returns
    /// [`CapabilityError`] when the platform has no location capability.
    fn watch(
        &self,
        options: WatchOptions,
        events: mpsc::UnboundedSender<WatchEvent>,
    ) -> Result<WatchId, CapabilityError>;

    /// Cancel a previously opened watch.
    ///
    /// Idempotent; unknown ids are ignored.
    fn clear_watch(&self, id: WatchId);
}

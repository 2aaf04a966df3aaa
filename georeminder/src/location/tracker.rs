//! Location tracker state machine.
//!
//! Owns the single active position watch and all transitions between
//! accuracy modes. Transitions are explicit methods driven by events
//! (provider error, visibility change, teardown) so re-subscription
//! ordering and cancellation are deterministic and testable.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::provider::{
    LocationProvider, PositionSample, ProviderError, ProviderErrorCode, WatchEvent,
    WatchEventKind, WatchId, WatchOptions,
};
use super::throttle::{SampleThrottle, DEFAULT_THROTTLE_INTERVAL};
use crate::coord::Coordinate;

/// Watch options for the high-accuracy mode: precise fixes, short cache.
pub const HIGH_ACCURACY_OPTIONS: WatchOptions = WatchOptions {
    high_accuracy: true,
    timeout: Duration::from_secs(20),
    max_sample_age: Duration::from_secs(5),
};

/// Watch options for the low-accuracy fallback: relaxed timeout, long
/// acceptable sample age, lower power draw.
pub const LOW_ACCURACY_OPTIONS: WatchOptions = WatchOptions {
    high_accuracy: false,
    timeout: Duration::from_secs(30),
    max_sample_age: Duration::from_secs(60),
};

/// User-facing message when the platform has no location capability.
pub const MSG_UNSUPPORTED: &str = "Location is not supported on this device.";
/// User-facing message when the user denied the location permission.
pub const MSG_PERMISSION_DENIED: &str = "Location permission denied.";
/// User-facing message when acquisition timed out without any prior fix.
pub const MSG_TIMEOUT: &str = "Location request timed out. Move to an open area.";
/// Generic user-facing acquisition failure message.
pub const MSG_UNAVAILABLE: &str = "Could not obtain a location.";

/// Accuracy/power trade-off for the active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    /// Precise positioning; the initial mode.
    HighAccuracy,
    /// Relaxed positioning after a high-accuracy failure episode.
    LowAccuracy,
}

/// Application foreground/background state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Application visible; watch with the selected mode's options.
    Foreground,
    /// Application hidden; always watch with low-accuracy options.
    Background,
}

/// Lifecycle state of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Created, not yet started.
    Idle,
    /// Watch active with the given selected mode.
    ///
    /// The *selected* mode survives backgrounding; a backgrounded tracker
    /// in `Tracking(HighAccuracy)` still watches with low-accuracy options.
    Tracking(TrackingMode),
    /// Torn down; terminal.
    Stopped,
    /// Platform has no location capability; terminal.
    Unsupported,
}

/// Tracker configuration. The option sets are fixed engine constants; the
/// struct exists so tests can shorten the throttle interval.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Minimum interval between accepted samples.
    pub throttle_interval: Duration,
    /// Options used in high-accuracy mode while foregrounded.
    pub high_accuracy: WatchOptions,
    /// Options used in low-accuracy mode and while backgrounded.
    pub low_accuracy: WatchOptions,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            high_accuracy: HIGH_ACCURACY_OPTIONS,
            low_accuracy: LOW_ACCURACY_OPTIONS,
        }
    }
}

/// Maintains the single active position watch.
///
/// All methods are synchronous; the owning event loop feeds provider
/// events in arrival order via [`handle_event`](Self::handle_event).
pub struct LocationTracker<P: LocationProvider> {
    provider: Arc<P>,
    config: TrackerConfig,

    /// Sender handed to the provider for each watch.
    events_tx: mpsc::UnboundedSender<WatchEvent>,

    state: TrackerState,
    visibility: Visibility,
    throttle: SampleThrottle,

    /// The one live watch, if any. Events from other ids are stale.
    active_watch: Option<WatchId>,

    /// Whether any valid fix has ever been accepted this session. Gates
    /// user-facing error surfacing.
    had_fix: bool,

    position: Option<Coordinate>,
    error: Option<String>,
}

impl<P: LocationProvider> LocationTracker<P> {
    /// Create a tracker and the receiver for its provider events.
    ///
    /// The receiver is drained by the engine's event loop and fed back in
    /// through [`handle_event`](Self::handle_event).
    pub fn new(provider: Arc<P>, config: TrackerConfig) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let throttle = SampleThrottle::new(config.throttle_interval);

        let tracker = Self {
            provider,
            config,
            events_tx,
            state: TrackerState::Idle,
            visibility: Visibility::Foreground,
            throttle,
            active_watch: None,
            had_fix: false,
            position: None,
            error: None,
        };

        (tracker, events_rx)
    }

    /// Start tracking in high-accuracy mode.
    ///
    /// If the platform exposes no location capability the tracker reports
    /// "not supported" immediately and never attempts a subscription.
    pub fn start(&mut self) {
        if !matches!(self.state, TrackerState::Idle) {
            return;
        }

        if !self.provider.is_supported() {
            warn!("location provider not supported; tracker disabled");
            self.state = TrackerState::Unsupported;
            self.error = Some(MSG_UNSUPPORTED.to_string());
            return;
        }

        self.state = TrackerState::Tracking(TrackingMode::HighAccuracy);
        self.open_watch();
    }

    /// Stop tracking and cancel the active watch. Terminal.
    pub fn stop(&mut self) {
        self.clear_active_watch();
        if !matches!(self.state, TrackerState::Unsupported) {
            self.state = TrackerState::Stopped;
        }
        info!("location tracker stopped");
    }

    /// Handle a visibility change by re-subscribing with the appropriate
    /// options. Backgrounded watches always use low-accuracy options.
    pub fn on_visibility_change(&mut self, visibility: Visibility) {
        if self.visibility == visibility {
            return;
        }
        self.visibility = visibility;

        if matches!(self.state, TrackerState::Tracking(_)) {
            debug!(?visibility, "visibility changed, re-subscribing");
            self.open_watch();
        }
    }

    /// Process one provider event.
    ///
    /// Returns the sample when it was accepted (fresh watch, passed the
    /// throttle); the engine runs a geofence evaluation pass for each
    /// accepted sample.
    pub fn handle_event(&mut self, event: WatchEvent) -> Option<PositionSample> {
        if Some(event.watch) != self.active_watch {
            debug!(watch = event.watch.0, "ignoring event from stale watch");
            return None;
        }
        if !matches!(self.state, TrackerState::Tracking(_)) {
            return None;
        }

        match event.kind {
            WatchEventKind::Sample(sample) => self.handle_sample(sample),
            WatchEventKind::Error(error) => {
                self.handle_error(&error);
                None
            }
        }
    }

    /// Seed the current position from outside the provider stream (the
    /// "locate me" control). Bypasses the throttle; does not touch the
    /// error state.
    pub fn seed_position(&mut self, coordinate: Coordinate) {
        self.position = Some(coordinate);
    }

    /// Latest known position, if any.
    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    /// Current user-facing error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Currently selected accuracy mode, if tracking.
    pub fn mode(&self) -> Option<TrackingMode> {
        match self.state {
            TrackerState::Tracking(mode) => Some(mode),
            _ => None,
        }
    }

    fn handle_sample(&mut self, sample: PositionSample) -> Option<PositionSample> {
        if !self.throttle.accept(sample.captured_at) {
            return None;
        }

        debug!(
            lat = sample.coordinate.lat,
            lng = sample.coordinate.lng,
            "position sample accepted"
        );
        self.position = Some(sample.coordinate);
        self.error = None;
        self.had_fix = true;
        Some(sample)
    }

    fn handle_error(&mut self, error: &ProviderError) {
        warn!(code = ?error.code, message = %error.message, "location provider error");

        // Transient failure in high-accuracy mode: relax the subscription
        // instead of surfacing anything. Happens at most once per episode
        // since the mode never bounces back to high automatically.
        if matches!(
            error.code,
            ProviderErrorCode::Timeout | ProviderErrorCode::PositionUnavailable
        ) && self.state == TrackerState::Tracking(TrackingMode::HighAccuracy)
        {
            info!("falling back to low-accuracy tracking");
            self.state = TrackerState::Tracking(TrackingMode::LowAccuracy);
            self.open_watch();
            return;
        }

        // Surface an error only while no fix has ever been obtained;
        // transient loss after a fix would just flap the UI.
        if !self.had_fix {
            let message = match error.code {
                ProviderErrorCode::PermissionDenied => MSG_PERMISSION_DENIED,
                ProviderErrorCode::Timeout => MSG_TIMEOUT,
                ProviderErrorCode::PositionUnavailable => MSG_UNAVAILABLE,
            };
            self.error = Some(message.to_string());
        }
    }

    /// Open a watch with the options for the current mode and visibility,
    /// cancelling the previous watch first so no two run concurrently.
    fn open_watch(&mut self) {
        self.clear_active_watch();

        let options = self.current_options();
        match self.provider.watch(options, self.events_tx.clone()) {
            Ok(id) => {
                debug!(
                    watch = id.0,
                    high_accuracy = options.high_accuracy,
                    "position watch opened"
                );
                self.active_watch = Some(id);
            }
            Err(e) => {
                warn!(error = %e, "failed to open position watch");
                self.state = TrackerState::Unsupported;
                if !self.had_fix {
                    self.error = Some(MSG_UNSUPPORTED.to_string());
                }
            }
        }
    }

    fn current_options(&self) -> WatchOptions {
        match (self.visibility, self.state) {
            (Visibility::Background, _) => self.config.low_accuracy,
            (_, TrackerState::Tracking(TrackingMode::LowAccuracy)) => self.config.low_accuracy,
            _ => self.config.high_accuracy,
        }
    }

    fn clear_active_watch(&mut self) {
        if let Some(id) = self.active_watch.take() {
            self.provider.clear_watch(id);
        }
    }
}

//! Continuous location acquisition.
//!
//! This module maintains exactly one active subscription to the platform's
//! position stream, adapting accuracy to failures and application
//! visibility, and throttling the sample rate seen by consumers.
//!
//! # State Machine
//!
//! ```text
//!            start()              timeout/unavailable
//!   Idle ------------> Tracking(High) ----------------> Tracking(Low)
//!     |                      |                                |
//!     | provider absent      |          stop()                |
//!     v                      +------------+------------------+
//!  Unsupported                            v
//!                                      Stopped
//! ```
//!
//! Visibility changes re-subscribe in place: a backgrounded application
//! always watches with the low-accuracy options regardless of the selected
//! mode; foregrounding restores the options for the selected mode.

mod provider;
mod throttle;
mod tracker;

pub use provider::{
    CapabilityError, LocationProvider, PositionSample, ProviderError, ProviderErrorCode,
    WatchEvent, WatchEventKind, WatchId, WatchOptions,
};
pub use throttle::{SampleThrottle, DEFAULT_THROTTLE_INTERVAL};
pub use tracker::{
    LocationTracker, TrackerConfig, TrackerState, TrackingMode, Visibility,
    HIGH_ACCURACY_OPTIONS, LOW_ACCURACY_OPTIONS, MSG_PERMISSION_DENIED, MSG_TIMEOUT,
    MSG_UNAVAILABLE, MSG_UNSUPPORTED,
};

//! The platform notification seam.
//!
//! [`NotificationPlatform`] abstracts the host's notification capability:
//! the permission lifecycle, an optional background-capable delivery
//! surface (one that can post notifications while the application is not
//! foregrounded), and direct synchronous construction. Trait methods that
//! suspend return boxed futures so the trait stays object-safe.

use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

/// Platform notification-permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// The platform exposes no notification capability.
    Unsupported,
    /// The user has not been asked yet.
    Default,
    /// The user granted permission.
    Granted,
    /// The user denied permission. Never re-prompted.
    Denied,
}

/// A delivery-path failure. Always recoverable: the channel falls back or
/// swallows it.
#[derive(Debug, Clone, Error)]
#[error("notification delivery failed: {0}")]
pub struct DeliveryError(pub String);

impl DeliveryError {
    /// Create a new delivery error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Presentation options for a notification.
///
/// `tag` gives platforms with tag semantics a handle to replace an earlier
/// notification for the same task; the engine never reuses a tag because of
/// the triggered-set guard, but hosts re-delivering manually may.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationOptions {
    /// Main notification text.
    pub body: String,
    /// Replacement handle, e.g. `geofence-{task_id}`.
    pub tag: String,
    /// Optional icon asset reference.
    pub icon: Option<String>,
    /// Optional badge asset reference.
    pub badge: Option<String>,
    /// Whether a tag replacement should re-alert the user.
    pub renotify: bool,
    /// Vibration pattern in milliseconds, for platforms that support it.
    pub vibrate: Vec<u64>,
    /// Structured payload attached to the notification (e.g. the task id).
    pub data: Option<Value>,
}

/// A delivery surface reachable through the background-capable path.
pub trait NotificationSurface: Send + Sync {
    /// Post a notification through this surface.
    fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> BoxFuture<'_, Result<(), DeliveryError>>;
}

/// The host platform's notification capability.
pub trait NotificationPlatform: Send + Sync + 'static {
    /// Current permission state. [`PermissionState::Unsupported`] when the
    /// platform has no notification capability at all.
    fn permission(&self) -> PermissionState;

    /// Prompt the user for permission and resolve to the resulting state.
    ///
    /// Only called while the state is [`PermissionState::Default`]; the
    /// channel never re-prompts an answered user.
    fn request_permission(&self) -> BoxFuture<'_, PermissionState>;

    /// The background-capable delivery path's readiness future, or `None`
    /// when the platform exposes no such path.
    ///
    /// Resolving to a surface means the path is ready for
    /// [`NotificationSurface::show_notification`]; resolving to an error
    /// makes the channel fall back to direct delivery.
    #[allow(clippy::type_complexity)]
    fn background_ready(
        &self,
    ) -> Option<BoxFuture<'_, Result<Box<dyn NotificationSurface>, DeliveryError>>>;

    /// Construct and post a notification directly, synchronously.
    fn deliver_direct(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), DeliveryError>;
}

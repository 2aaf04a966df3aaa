//! Notification channel: permission lifecycle plus dual-path delivery.

use std::sync::Arc;

use tracing::{debug, warn};

use super::platform::{NotificationOptions, NotificationPlatform, PermissionState};

/// Delivers notifications through the best available path, gated by the
/// platform permission state.
pub struct NotificationChannel<N: NotificationPlatform> {
    platform: Arc<N>,
}

impl<N: NotificationPlatform> NotificationChannel<N> {
    /// Create a channel over the given platform.
    pub fn new(platform: Arc<N>) -> Self {
        Self { platform }
    }

    /// Current platform permission state.
    pub fn permission(&self) -> PermissionState {
        self.platform.permission()
    }

    /// Ask for notification permission if the user has not answered yet.
    ///
    /// No-op on unsupported platforms, and never re-prompts once the user
    /// has granted or denied. Returns the resulting state.
    pub async fn request_permission(&self) -> PermissionState {
        match self.platform.permission() {
            PermissionState::Default => {
                let state = self.platform.request_permission().await;
                debug!(?state, "notification permission prompt answered");
                state
            }
            state => state,
        }
    }

    /// Deliver a notification, best effort.
    ///
    /// No-op unless permission is granted. Tries the background-capable
    /// path first; any failure there degrades to direct delivery, and a
    /// direct failure is logged and swallowed. Never returns an error.
    pub async fn notify(&self, title: &str, options: &NotificationOptions) {
        if self.platform.permission() != PermissionState::Granted {
            debug!(tag = %options.tag, "notification suppressed: permission not granted");
            return;
        }

        if let Some(ready) = self.platform.background_ready() {
            match ready.await {
                Ok(surface) => match surface.show_notification(title, options).await {
                    Ok(()) => {
                        debug!(tag = %options.tag, "notification delivered via background path");
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "background notification failed, falling back to direct");
                    }
                },
                Err(e) => {
                    warn!(error = %e, "background path not ready, falling back to direct");
                }
            }
        }

        if let Err(e) = self.platform.deliver_direct(title, options) {
            warn!(error = %e, tag = %options.tag, "direct notification failed");
        } else {
            debug!(tag = %options.tag, "notification delivered via direct path");
        }
    }
}

//! Engine configuration.

use crate::location::TrackerConfig;

/// Top-level configuration for [`super::GeofenceEngine`].
///
/// The tracking option sets are fixed engine constants
/// ([`crate::location::HIGH_ACCURACY_OPTIONS`] /
/// [`crate::location::LOW_ACCURACY_OPTIONS`]); the config exists so tests
/// can shorten intervals and so hosts can brand the notification assets.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Location tracker configuration.
    pub tracker: TrackerConfig,

    /// Icon asset reference attached to arrival notifications.
    pub notification_icon: Option<String>,

    /// Badge asset reference attached to arrival notifications.
    pub notification_badge: Option<String>,
}

impl EngineConfig {
    /// Set the notification icon asset.
    pub fn with_notification_icon(mut self, icon: impl Into<String>) -> Self {
        self.notification_icon = Some(icon.into());
        self
    }

    /// Set the notification badge asset.
    pub fn with_notification_badge(mut self, badge: impl Into<String>) -> Self {
        self.notification_badge = Some(badge.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{HIGH_ACCURACY_OPTIONS, LOW_ACCURACY_OPTIONS};
    use std::time::Duration;

    #[test]
    fn test_default_config_uses_fixed_option_sets() {
        let config = EngineConfig::default();
        assert_eq!(config.tracker.high_accuracy, HIGH_ACCURACY_OPTIONS);
        assert_eq!(config.tracker.low_accuracy, LOW_ACCURACY_OPTIONS);
        assert_eq!(config.tracker.throttle_interval, Duration::from_millis(2000));
        assert!(config.notification_icon.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let config = EngineConfig::default()
            .with_notification_icon("/images/marker-icon.png")
            .with_notification_badge("/images/marker-icon.png");
        assert_eq!(
            config.notification_icon.as_deref(),
            Some("/images/marker-icon.png")
        );
        assert!(config.notification_badge.is_some());
    }
}

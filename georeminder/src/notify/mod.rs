//! Notification delivery with permission gating and path fallback.
//!
//! Delivery is best-effort and never fatal: the background-capable path is
//! tried first when the platform exposes one, falling back to direct
//! construction, and a failure of both is logged and swallowed.
//!
//! ```text
//! notify(title, options)
//!   ├── permission != Granted ──► no-op
//!   ├── background path ready ──► surface.show_notification(..)
//!   │        └── unavailable / error
//!   └──────► direct delivery ──► error logged, swallowed
//! ```

mod channel;
mod platform;

pub use channel::NotificationChannel;
pub use platform::{
    DeliveryError, NotificationOptions, NotificationPlatform, NotificationSurface,
    PermissionState,
};

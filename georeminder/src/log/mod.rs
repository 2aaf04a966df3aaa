//! Logging initialisation for host applications.
//!
//! The engine itself only emits `tracing` events; installing a subscriber
//! is the host's choice. Hosts without their own subscriber call
//! [`init`] once at startup. Filtering follows `RUST_LOG`, defaulting to
//! `info` for this crate.

use tracing_subscriber::EnvFilter;

/// Install the default fmt subscriber, honouring `RUST_LOG`.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    let _ = try_init();
}

/// Install the default fmt subscriber, returning an error if a global
/// subscriber is already set.
pub fn try_init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("georeminder=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        // Second try_init must report the existing subscriber, not panic.
        assert!(try_init().is_err());
    }
}

//! Shared constants for the host and its plugins

use std::time::Duration;

/// Default read interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 10_000;

/// Default read interval used when the configuration does not name one
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(DEFAULT_INTERVAL_MS);

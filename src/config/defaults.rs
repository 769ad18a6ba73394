//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default API base URL.
pub const HOST: &str = "https://api.checkout-client.dev";

/// Default API version sent in `X-Api-Version`.
pub const API_VERSION: &str = "2024-06-01";

/// Default per-attempt timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default number of retries after the first attempt.
pub const MAX_RETRIES: u32 = 2;

/// Default webhook replay tolerance in seconds.
pub const WEBHOOK_TOLERANCE_SECS: u64 = 300;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("checkout-client/", env!("CARGO_PKG_VERSION"));

/// Directory under the user config dir that holds the config file.
pub const CONFIG_DIR_NAME: &str = "checkout-client";

/// Name of the config file inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default per-attempt timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Default webhook replay tolerance as Duration.
#[must_use]
pub const fn webhook_tolerance() -> Duration {
    Duration::from_secs(WEBHOOK_TOLERANCE_SECS)
}

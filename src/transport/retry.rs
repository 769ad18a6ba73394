//! Retry-backoff policy for API calls.
//!
//! The policy is a pure decision over `(attempt, max_retries, failure class,
//! server hint)`. It holds no per-call state; the attempt counter lives in
//! the caller's retry loop.

use std::time::Duration;

use rand::Rng;

/// Classification of a failed attempt.
///
/// Each class carries its own retry rule; see [`RetryPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// A 4xx response other than 429, or any non-2xx outside 4xx/5xx.
    ClientError,
    /// A 429 response.
    RateLimited,
    /// A 5xx response.
    ServerError,
    /// No response: connection failure or per-attempt deadline elapsed.
    NetworkOrTimeout,
}

impl FailureClass {
    /// Classifies a response status.
    ///
    /// Returns `None` for 2xx, which is not a failure.
    #[must_use]
    pub fn from_status(status: http::StatusCode) -> Option<Self> {
        if status.is_success() {
            None
        } else if status == http::StatusCode::TOO_MANY_REQUESTS {
            Some(Self::RateLimited)
        } else if status.is_server_error() {
            Some(Self::ServerError)
        } else {
            Some(Self::ClientError)
        }
    }

    /// Returns a short lowercase label for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientError => "client_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::NetworkOrTimeout => "network_or_timeout",
        }
    }
}

/// Outcome of a retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the given delay, then make another attempt.
    Retry(Duration),
    /// Give up; the failure is terminal.
    Stop,
}

/// Configuration for exponential backoff with jitter.
///
/// # Defaults
///
/// - `initial_delay`: 500 ms
/// - `max_delay`: 30 seconds
/// - `multiplier`: 2.0
/// - jitter factor: uniform in `[0.75, 1.25]`
/// - `default_retry_after`: 1 second (used for 429 without `Retry-After`)
///
/// # Example
///
/// ```
/// use checkout_client::transport::{FailureClass, RetryDecision, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
///
/// // 4xx is never retried
/// assert_eq!(
///     policy.decide(0, 2, FailureClass::ClientError, None),
///     RetryDecision::Stop
/// );
///
/// // 429 honors the server's hint
/// assert_eq!(
///     policy.decide(0, 2, FailureClass::RateLimited, Some(Duration::from_secs(2))),
///     RetryDecision::Retry(Duration::from_secs(2))
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Base delay before the first retry.
    ///
    /// Retry `n` (0-indexed) waits `initial_delay * multiplier^n` before jitter.
    pub initial_delay: Duration,

    /// Upper bound applied after jitter.
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,

    /// Delay used for rate-limited responses without a usable `Retry-After`.
    pub default_retry_after: Duration,
}

impl RetryPolicy {
    /// Default initial delay (500 ms).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

    /// Default maximum delay (30 seconds).
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

    /// Default multiplier (2.0).
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Default delay for 429 responses without `Retry-After` (1 second).
    pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

    /// Lower bound of the jitter factor.
    pub const JITTER_MIN: f64 = 0.75;

    /// Upper bound of the jitter factor.
    pub const JITTER_MAX: f64 = 1.25;

    /// Creates a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
            default_retry_after: Self::DEFAULT_RETRY_AFTER,
        }
    }

    /// Sets the initial delay between retries.
    ///
    /// Zero delay is supported (useful for testing with [`InstantSleeper`])
    /// but not recommended for production as it creates a tight retry loop.
    ///
    /// [`InstantSleeper`]: crate::time::InstantSleeper
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the delay multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is not positive (must be > 0.0).
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// Sets the fallback delay for rate-limited responses.
    #[must_use]
    pub const fn with_default_retry_after(mut self, delay: Duration) -> Self {
        self.default_retry_after = delay;
        self
    }

    /// Decides whether to retry, sampling a fresh jitter factor.
    ///
    /// # Arguments
    ///
    /// * `attempt` - Zero-based index of the attempt that just failed
    /// * `max_retries` - Number of retries allowed after the first attempt
    /// * `class` - Classification of the failure
    /// * `server_hint` - Parsed `Retry-After` value, if the server sent one
    #[must_use]
    pub fn decide(
        &self,
        attempt: u32,
        max_retries: u32,
        class: FailureClass,
        server_hint: Option<Duration>,
    ) -> RetryDecision {
        let jitter = rand::thread_rng().gen_range(Self::JITTER_MIN..=Self::JITTER_MAX);
        self.decide_with_jitter(attempt, max_retries, class, server_hint, jitter)
    }

    /// Deterministic form of [`decide`](Self::decide) with an explicit jitter factor.
    ///
    /// Rules:
    /// - `ClientError`: always [`RetryDecision::Stop`].
    /// - `RateLimited`: retry while `attempt < max_retries`, waiting exactly the
    ///   server hint (or `default_retry_after`). Jitter does not apply.
    /// - `ServerError` / `NetworkOrTimeout`: retry while `attempt < max_retries`,
    ///   waiting [`backoff_delay`](Self::backoff_delay).
    #[must_use]
    pub fn decide_with_jitter(
        &self,
        attempt: u32,
        max_retries: u32,
        class: FailureClass,
        server_hint: Option<Duration>,
        jitter: f64,
    ) -> RetryDecision {
        if attempt >= max_retries {
            return RetryDecision::Stop;
        }

        match class {
            FailureClass::ClientError => RetryDecision::Stop,
            FailureClass::RateLimited => {
                RetryDecision::Retry(server_hint.unwrap_or(self.default_retry_after))
            }
            FailureClass::ServerError | FailureClass::NetworkOrTimeout => {
                RetryDecision::Retry(self.backoff_delay(attempt, jitter))
            }
        }
    }

    /// Computes the jittered exponential delay for a given retry (0-indexed).
    ///
    /// `initial_delay * multiplier^retry * jitter`, capped at `max_delay`.
    #[must_use]
    pub fn backoff_delay(&self, retry: u32, jitter: f64) -> Duration {
        let multiplier = self.multiplier.powi(i32::try_from(retry).unwrap_or(i32::MAX));
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier * jitter.max(0.0);
        let capped = delay_secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a `Retry-After` header value given in seconds.
///
/// Accepts integer and fractional seconds. Negative, non-finite and
/// non-numeric values (including HTTP-dates) yield `None`, so the caller
/// falls back to the policy default.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

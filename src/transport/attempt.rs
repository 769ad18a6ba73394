//! Per-call options and attempt bookkeeping.

use std::time::Duration;

/// Per-call overrides for a single logical API call.
///
/// Unset fields fall back to the client's [`ClientConfig`].
///
/// [`ClientConfig`]: crate::config::ClientConfig
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Per-attempt deadline.
    pub timeout: Option<Duration>,
    /// Retry budget after the first attempt.
    pub max_retries: Option<u32>,
    /// Key the server uses to deduplicate retried requests.
    pub idempotency_key: Option<String>,
}

impl RequestOptions {
    /// Creates options that inherit every client default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the per-attempt deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Attaches an idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// State carried across the physical attempts of one logical call.
///
/// Lives on the stack of a single `execute` call and is never shared.
/// The idempotency key is fixed at construction; the request id is
/// regenerated by [`begin_attempt`](Self::begin_attempt).
#[derive(Debug, Clone)]
pub struct AttemptContext {
    attempt: u32,
    max_retries: u32,
    request_id: String,
    idempotency_key: Option<String>,
}

impl AttemptContext {
    /// Creates the context for a new logical call, before its first attempt.
    #[must_use]
    pub fn new(max_retries: u32, idempotency_key: Option<String>) -> Self {
        Self {
            attempt: 0,
            max_retries,
            request_id: String::new(),
            idempotency_key,
        }
    }

    /// Generates a fresh request id for the attempt about to be sent.
    pub fn begin_attempt(&mut self) -> &str {
        self.request_id = generate_request_id();
        &self.request_id
    }

    /// Advances to the next attempt after a retry decision.
    pub const fn advance(&mut self) {
        self.attempt += 1;
    }

    /// Zero-based index of the current attempt.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Total physical attempts made so far, including the current one.
    #[must_use]
    pub const fn attempts_made(&self) -> u32 {
        self.attempt + 1
    }

    /// Retry budget for this call.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Request id of the current attempt.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Caller-supplied idempotency key, identical for every attempt.
    #[must_use]
    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }
}

/// Generates a request identifier of the form `req_<32 hex chars>`.
#[must_use]
pub fn generate_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().simple())
}

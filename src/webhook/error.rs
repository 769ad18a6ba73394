//! Error types for webhook verification.

use std::time::Duration;

use thiserror::Error;

/// Reason an inbound webhook was rejected.
///
/// Verification failures are terminal: a stale or mismatched signature is
/// never a transient condition.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature header could not be parsed.
    #[error("Malformed signature header: {0}")]
    MalformedHeader(String),

    /// The signed timestamp is older than the tolerance allows.
    #[error("Event timestamp is {age}s old, outside the {}s tolerance", tolerance.as_secs())]
    StaleEvent {
        /// Age of the event in seconds at verification time
        age: i64,
        /// Tolerance that was exceeded
        tolerance: Duration,
    },

    /// No signature in the header matched the expected digest.
    #[error("No signatures found matching the expected signature for payload")]
    SignatureMismatch,

    /// The payload was authentic but is not a valid event envelope.
    #[error("Failed to decode event payload: {0}")]
    PayloadDecode(#[from] serde_json::Error),
}

impl WebhookError {
    /// Returns a stable snake_case code for this failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedHeader(_) => "malformed_header",
            Self::StaleEvent { .. } => "stale_event",
            Self::SignatureMismatch => "signature_mismatch",
            Self::PayloadDecode(_) => "payload_decode_error",
        }
    }
}

//! Webhook verification: header parsing, freshness check, signature match.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::signature::{compute_signature, secure_compare};
use crate::time::{Clock, SystemClock};

use super::{Event, SignatureHeader, WebhookError};

/// Default maximum event age (5 minutes).
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Verifies inbound webhook deliveries.
///
/// Verification runs three stages in order, each a hard gate:
///
/// 1. **Parse** the signature header ([`SignatureHeader::parse`]).
/// 2. **Freshness**: reject if `now - timestamp` exceeds the tolerance. This
///    runs before any HMAC work, and a correctly signed old event is still
///    rejected.
/// 3. **Signature**: recompute the digest over the *raw* payload bytes with
///    the parsed timestamp and accept if any header signature matches in
///    constant time.
///
/// The verifier holds no secret and no mutable state; one instance can
/// serve concurrent requests.
///
/// # Type Parameters
///
/// - `C`: Clock used for the freshness check (defaults to [`SystemClock`])
///
/// # Example
///
/// ```
/// use checkout_client::time::Clock;
/// use checkout_client::webhook::{Webhook, generate_test_header};
///
/// let payload = br#"{"id":"evt_1","type":"checkout_session.completed","data":{},"created":1,"livemode":false}"#;
/// let webhook = Webhook::new();
/// let header = generate_test_header(payload, "whsec_test", webhook.clock().unix_timestamp());
///
/// assert!(webhook.verify(payload, &header, "whsec_test", None));
/// let event: checkout_client::webhook::Event = webhook
///     .construct(payload, &header, "whsec_test", None)
///     .unwrap();
/// assert_eq!(event.id, "evt_1");
/// ```
#[derive(Debug, Clone)]
pub struct Webhook<C = SystemClock> {
    clock: C,
    tolerance: Duration,
}

impl Webhook<SystemClock> {
    /// Creates a verifier using the system clock and the default tolerance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock: SystemClock,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Default for Webhook<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Webhook<C> {
    /// Replaces the clock used for freshness checks.
    ///
    /// Primarily useful in tests to pin "now".
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> Webhook<C2> {
        Webhook {
            clock,
            tolerance: self.tolerance,
        }
    }

    /// Sets the tolerance applied when a call does not override it.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns the default tolerance of this verifier.
    #[must_use]
    pub const fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Returns the clock used for freshness checks.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> Webhook<C> {
    /// Returns whether the delivery is authentic and fresh.
    ///
    /// Every failure, including a malformed header, is reported as `false`.
    /// The payload is not decoded.
    #[must_use]
    pub fn verify(
        &self,
        payload: &[u8],
        header: &str,
        secret: &str,
        tolerance: Option<Duration>,
    ) -> bool {
        self.verify_header(payload, header, secret, tolerance).is_ok()
    }

    /// Verifies the delivery and decodes it into an [`Event`].
    ///
    /// # Errors
    ///
    /// - [`WebhookError::MalformedHeader`] if the header cannot be parsed
    /// - [`WebhookError::StaleEvent`] if the timestamp is outside the tolerance
    /// - [`WebhookError::SignatureMismatch`] if no signature matches
    /// - [`WebhookError::PayloadDecode`] if the verified payload is not an event
    pub fn construct<T: DeserializeOwned>(
        &self,
        payload: &[u8],
        header: &str,
        secret: &str,
        tolerance: Option<Duration>,
    ) -> Result<Event<T>, WebhookError> {
        self.verify_header(payload, header, secret, tolerance)?;
        serde_json::from_slice(payload).map_err(|e| {
            tracing::debug!(code = "payload_decode_error", "Webhook payload rejected: {e}");
            WebhookError::PayloadDecode(e)
        })
    }

    /// Runs the parse, freshness and signature stages without decoding.
    ///
    /// Returns the parsed header on success.
    ///
    /// # Errors
    ///
    /// Same as [`construct`](Self::construct), minus payload decoding.
    pub fn verify_header(
        &self,
        payload: &[u8],
        header: &str,
        secret: &str,
        tolerance: Option<Duration>,
    ) -> Result<SignatureHeader, WebhookError> {
        let result = SignatureHeader::parse(header).and_then(|parsed| {
            self.check_freshness(parsed.timestamp(), tolerance.unwrap_or(self.tolerance))?;
            check_signature(&parsed, payload, secret)?;
            Ok(parsed)
        });

        if let Err(ref e) = result {
            tracing::debug!(code = e.code(), "Webhook verification failed");
        }
        result
    }

    fn check_freshness(&self, timestamp: i64, tolerance: Duration) -> Result<(), WebhookError> {
        let age = self.clock.unix_timestamp().saturating_sub(timestamp);
        let limit = i64::try_from(tolerance.as_secs()).unwrap_or(i64::MAX);

        if age > limit {
            return Err(WebhookError::StaleEvent { age, tolerance });
        }
        Ok(())
    }
}

fn check_signature(
    header: &SignatureHeader,
    payload: &[u8],
    secret: &str,
) -> Result<(), WebhookError> {
    let expected = compute_signature(header.timestamp(), payload, secret);

    if header
        .signatures()
        .iter()
        .any(|candidate| secure_compare(candidate, &expected))
    {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Builds a valid signature header for `payload`.
///
/// For test harnesses that need to simulate a delivery; production
/// verification never calls this.
#[must_use]
pub fn generate_test_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    format!(
        "t={timestamp},{}={}",
        super::header::SIGNATURE_SCHEME,
        compute_signature(timestamp, payload, secret)
    )
}

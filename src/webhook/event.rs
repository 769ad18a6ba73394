//! Verified webhook event envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A verified, decoded webhook event.
///
/// Only produced by [`Webhook::construct`](super::Webhook::construct) after
/// the signature and timestamp have been checked. `T` is the shape of
/// `data`; it defaults to untyped JSON so callers can dispatch on
/// [`event_type`](Self::event_type) before decoding further.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(bound(deserialize = "T: DeserializeOwned", serialize = "T: Serialize"))]
pub struct Event<T = serde_json::Value> {
    /// Unique event identifier.
    pub id: String,
    /// Dotted event type, e.g. `checkout_session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: T,
    /// Creation time in seconds since the Unix epoch.
    pub created: i64,
    /// `true` for production events, `false` for test mode.
    pub livemode: bool,
}

impl Event<serde_json::Value> {
    /// Decodes the untyped `data` into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if `data` does not match `U`.
    pub fn data_as<U: DeserializeOwned>(&self) -> Result<U, serde_json::Error> {
        U::deserialize(&self.data)
    }
}

impl<T> Event<T> {
    /// Returns true if the event type matches `event_type` exactly.
    #[must_use]
    pub fn is(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }
}

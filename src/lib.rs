//! checkout-client: client library for a checkout REST API
//!
//! Two independent halves:
//! - [`webhook`] verifies signed inbound deliveries (HMAC-SHA256 over
//!   `"{timestamp}.{payload}"`, replay tolerance) and decodes them into events.
//! - [`transport`] executes outbound API calls, retrying network failures,
//!   rate limits and server errors with jittered exponential backoff.
//!
//! Failures from both surface as the closed [`error::Error`] enum.

pub mod config;
pub mod error;
pub mod signature;
pub mod time;
pub mod transport;
pub mod webhook;

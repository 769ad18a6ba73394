//! Inbound webhook verification.
//!
//! This module provides:
//! - Signature header parsing ([`SignatureHeader`])
//! - Replay-window and signature checks ([`Webhook`])
//! - The verified event envelope ([`Event`])
//! - A header generator for test harnesses ([`generate_test_header`])

mod error;
mod event;
mod header;
mod verifier;


pub use error::WebhookError;
pub use event::Event;
pub use header::{SIGNATURE_SCHEME, SignatureHeader};
pub use verifier::{DEFAULT_TOLERANCE, Webhook, generate_test_header};

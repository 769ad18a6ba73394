//! Transport-level error types.

use thiserror::Error;

/// Failure to obtain any HTTP response for a single attempt.
///
/// Status-code failures are not represented here; a 4xx or 5xx response is
/// still a response and is classified by the pipeline.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, refused or reset connections,
    /// TLS failures and errors while reading the response body.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The per-attempt deadline elapsed before a response arrived.
    #[error("Request timed out")]
    Timeout,

    /// The request URL could not be built or was rejected by the client.
    ///
    /// A configuration problem, never retried.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

//! Outbound API transport.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - Retry decisions per failure class ([`RetryPolicy`], [`FailureClass`])
//! - Executing API calls with retries ([`ApiClient`], [`RequestOptions`])

mod attempt;
mod client;
mod error;
mod http;
mod pipeline;
mod retry;

#[cfg(test)]
mod client_tests;
#[cfg(test)]
mod retry_tests;

pub use attempt::{AttemptContext, RequestOptions, generate_request_id};
pub use client::ReqwestClient;
pub use error::HttpError;
pub use http::{
    API_VERSION_HEADER, HttpClient, HttpRequest, HttpResponse, IDEMPOTENCY_KEY_HEADER,
    REQUEST_ID_HEADER,
};
pub use pipeline::ApiClient;
pub use retry::{FailureClass, RetryDecision, RetryPolicy, parse_retry_after};

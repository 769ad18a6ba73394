//! Error types surfaced to callers of the API client.
//!
//! [`Error`] is a closed set: callers match on it (or on [`Error::kind`]) to
//! tell authentication, validation, rate limiting and transient network
//! failures apart without inspecting messages.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::transport::{HttpResponse, parse_retry_after};
use crate::webhook::WebhookError;

/// Longest response-body excerpt used as a fallback error message.
const MAX_BODY_EXCERPT: usize = 500;

/// Server- and client-side context attached to an API error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetails {
    /// Human-readable description.
    pub message: String,
    /// Machine-readable code from the error envelope (e.g. `"resource_missing"`).
    pub code: Option<String>,
    /// Error type from the error envelope (e.g. `"invalid_request_error"`).
    pub error_type: Option<String>,
    /// HTTP status of the final response, if there was one.
    pub status: Option<http::StatusCode>,
    /// Server-assigned request id, or the locally generated one.
    pub request_id: Option<String>,
}

impl ErrorDetails {
    /// Creates details carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets the HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: http::StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(status) = self.status {
            write!(f, " (status {})", status.as_u16())?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " [request_id: {request_id}]")?;
        }
        Ok(())
    }
}

/// Stable, machine-checkable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401: missing or invalid credential.
    Authentication,
    /// 403: credential lacks access to the resource.
    Permission,
    /// 404: resource does not exist.
    NotFound,
    /// 400 and other 4xx: the request was rejected.
    InvalidRequest,
    /// 429: too many requests.
    RateLimit,
    /// Unexpected response from the API.
    Api,
    /// No usable response after all retries.
    Connection,
    /// Inbound webhook failed verification.
    SignatureVerification,
    /// The request path could not be resolved against the host.
    InvalidUrl,
}

impl ErrorKind {
    /// Returns the snake_case code for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication_error",
            Self::Permission => "permission_error",
            Self::NotFound => "not_found_error",
            Self::InvalidRequest => "invalid_request_error",
            Self::RateLimit => "rate_limit_error",
            Self::Api => "api_error",
            Self::Connection => "connection_error",
            Self::SignatureVerification => "signature_verification_error",
            Self::InvalidUrl => "invalid_url_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by API calls and webhook construction.
#[derive(Debug, Error)]
pub enum Error {
    /// The API rejected the credential (401).
    #[error("Authentication error: {0}")]
    Authentication(ErrorDetails),

    /// The credential is not allowed to perform the request (403).
    #[error("Permission error: {0}")]
    Permission(ErrorDetails),

    /// The requested resource does not exist (404).
    #[error("Not found: {0}")]
    NotFound(ErrorDetails),

    /// The request was invalid (400 and other 4xx).
    #[error("Invalid request: {details}")]
    InvalidRequest {
        /// Error context
        details: ErrorDetails,
        /// Name of the offending parameter, when the server reported it
        param: Option<String>,
    },

    /// Rate limit still exceeded after all retries (429).
    #[error("Rate limit exceeded: {details}")]
    RateLimit {
        /// Error context
        details: ErrorDetails,
        /// `Retry-After` from the final response
        retry_after: Option<Duration>,
    },

    /// The API returned an unexpected response.
    #[error("API error: {0}")]
    Api(ErrorDetails),

    /// Every attempt failed with a network error, timeout or 5xx.
    #[error("Connection error after {attempts} attempt(s): {details}")]
    Connection {
        /// Context of the last failure
        details: ErrorDetails,
        /// Number of physical attempts made
        attempts: u32,
    },

    /// Webhook verification failed.
    #[error("Signature verification failed: {0}")]
    SignatureVerification(#[from] WebhookError),

    /// The request path could not be joined to the configured host.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The path that failed to resolve
        url: String,
        /// Parser error
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

impl Error {
    /// Maps a non-2xx response to an error.
    ///
    /// The body is parsed as `{ "error": { "type", "code", "message", "param" } }`.
    /// Without a parsable envelope the message falls back to the body text,
    /// then to the status reason. The response's own request id wins over
    /// `local_request_id`.
    #[must_use]
    pub fn from_response(response: &HttpResponse, local_request_id: &str) -> Self {
        let (details, param) = parse_error_response(response, local_request_id);

        match response.status.as_u16() {
            401 => Self::Authentication(details),
            403 => Self::Permission(details),
            404 => Self::NotFound(details),
            429 => Self::RateLimit {
                details,
                retry_after: response
                    .header_str(http::header::RETRY_AFTER.as_str())
                    .and_then(parse_retry_after),
            },
            400..=499 => Self::InvalidRequest { details, param },
            _ => Self::Api(details),
        }
    }

    /// Builds the terminal error for a call whose retries were exhausted on 5xx.
    ///
    /// The last response's message, status and request id are preserved.
    #[must_use]
    pub fn connection_from_response(
        response: &HttpResponse,
        local_request_id: &str,
        attempts: u32,
    ) -> Self {
        let (details, _) = parse_error_response(response, local_request_id);
        Self::Connection { details, attempts }
    }

    /// Returns the machine-checkable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Permission(_) => ErrorKind::Permission,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::Api(_) => ErrorKind::Api,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::SignatureVerification(_) => ErrorKind::SignatureVerification,
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
        }
    }

    /// Returns the API error context, if this error came from an API call.
    #[must_use]
    pub const fn details(&self) -> Option<&ErrorDetails> {
        match self {
            Self::Authentication(details)
            | Self::Permission(details)
            | Self::NotFound(details)
            | Self::Api(details)
            | Self::InvalidRequest { details, .. }
            | Self::RateLimit { details, .. }
            | Self::Connection { details, .. } => Some(details),
            Self::SignatureVerification(_) | Self::InvalidUrl { .. } => None,
        }
    }

    /// Returns the human-readable message without status or request id.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::SignatureVerification(e) => e.to_string(),
            Self::InvalidUrl { reason, .. } => reason.clone(),
            other => other
                .details()
                .map(|d| d.message.clone())
                .unwrap_or_default(),
        }
    }

    /// Returns the correlation id for cross-system debugging.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.details().and_then(|d| d.request_id.as_deref())
    }

    /// Returns the HTTP status of the final response, if any.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        self.details().and_then(|d| d.status)
    }

    /// Returns the offending parameter for invalid-request errors.
    #[must_use]
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::InvalidRequest { param, .. } => param.as_deref(),
            _ => None,
        }
    }
}

fn parse_error_response(
    response: &HttpResponse,
    local_request_id: &str,
) -> (ErrorDetails, Option<String>) {
    let status = response.status;
    let body = serde_json::from_slice::<ErrorEnvelope>(&response.body)
        .ok()
        .map(|envelope| envelope.error);

    let message = body
        .as_ref()
        .and_then(|b| b.message.clone())
        .or_else(|| body_excerpt(response))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| status.to_string(), ToString::to_string)
        });

    let (code, error_type, param) =
        body.map_or((None, None, None), |b| (b.code, b.error_type, b.param));

    let details = ErrorDetails {
        message,
        code,
        error_type,
        status: Some(status),
        request_id: Some(
            response
                .request_id()
                .unwrap_or(local_request_id)
                .to_string(),
        ),
    };
    (details, param)
}

fn body_excerpt(response: &HttpResponse) -> Option<String> {
    let text = response.body_text()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_BODY_EXCERPT).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::REQUEST_ID_HEADER;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(
            http::StatusCode::from_u16(status).unwrap(),
            http::HeaderMap::new(),
            body.as_bytes().to_vec(),
        )
    }

    fn envelope(error_type: &str, message: &str) -> String {
        format!(r#"{{"error":{{"type":"{error_type}","code":"some_code","message":"{message}"}}}}"#)
    }

    #[test]
    fn maps_status_codes_to_kinds() {
        let cases = [
            (400, ErrorKind::InvalidRequest),
            (401, ErrorKind::Authentication),
            (403, ErrorKind::Permission),
            (404, ErrorKind::NotFound),
            (409, ErrorKind::InvalidRequest),
            (422, ErrorKind::InvalidRequest),
            (429, ErrorKind::RateLimit),
            (500, ErrorKind::Api),
            (503, ErrorKind::Api),
            (302, ErrorKind::Api),
        ];

        for (status, kind) in cases {
            let error = Error::from_response(&response(status, "{}"), "req_local");
            assert_eq!(error.kind(), kind, "status {status}");
        }
    }

    #[test]
    fn parses_error_envelope() {
        let body = r#"{"error":{"type":"invalid_request_error","code":"parameter_missing","message":"Missing line_items","param":"line_items"}}"#;
        let error = Error::from_response(&response(400, body), "req_local");

        assert_eq!(error.message(), "Missing line_items");
        assert_eq!(error.param(), Some("line_items"));
        let details = error.details().unwrap();
        assert_eq!(details.code.as_deref(), Some("parameter_missing"));
        assert_eq!(details.error_type.as_deref(), Some("invalid_request_error"));
        assert_eq!(details.status, Some(http::StatusCode::BAD_REQUEST));
    }

    #[test]
    fn falls_back_to_body_text() {
        let error = Error::from_response(&response(502, "upstream exploded"), "req_local");
        assert_eq!(error.message(), "upstream exploded");
    }

    #[test]
    fn falls_back_to_status_reason() {
        let error = Error::from_response(&response(404, ""), "req_local");
        assert_eq!(error.message(), "Not Found");
    }

    #[test]
    fn prefers_server_request_id() {
        let mut resp = response(401, &envelope("authentication_error", "bad key"));
        resp.headers.insert(
            REQUEST_ID_HEADER,
            http::HeaderValue::from_static("req_server"),
        );

        let error = Error::from_response(&resp, "req_local");
        assert_eq!(error.request_id(), Some("req_server"));
    }

    #[test]
    fn uses_local_request_id_without_header() {
        let error = Error::from_response(&response(403, "{}"), "req_local");
        assert_eq!(error.request_id(), Some("req_local"));
    }

    #[test]
    fn rate_limit_carries_retry_after() {
        let mut resp = response(429, &envelope("rate_limit_error", "slow down"));
        resp.headers
            .insert(http::header::RETRY_AFTER, http::HeaderValue::from_static("7"));

        match Error::from_response(&resp, "req_local") {
            Error::RateLimit { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected rate limit error, got {other:?}"),
        }
    }

    #[test]
    fn display_includes_status_and_request_id() {
        let error = Error::from_response(&response(404, &envelope("x", "No such session")), "req_9");
        let text = error.to_string();

        assert!(text.contains("No such session"));
        assert!(text.contains("404"));
        assert!(text.contains("req_9"));
    }

    #[test]
    fn signature_error_has_no_details() {
        let error = Error::from(WebhookError::SignatureMismatch);

        assert_eq!(error.kind(), ErrorKind::SignatureVerification);
        assert!(error.details().is_none());
        assert!(error.request_id().is_none());
        assert!(!error.message().is_empty());
    }

    #[test]
    fn kind_codes_are_snake_case() {
        assert_eq!(ErrorKind::RateLimit.as_str(), "rate_limit_error");
        assert_eq!(ErrorKind::Connection.to_string(), "connection_error");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
    }
}

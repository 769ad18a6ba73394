//! Request pipeline: one logical API call over several physical attempts.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorDetails};
use crate::time::{Sleeper, TokioSleeper};

use super::http::{IDEMPOTENCY_KEY_HEADER, REQUEST_ID_HEADER};
use super::{
    AttemptContext, FailureClass, HttpClient, HttpError, HttpRequest, HttpResponse,
    RequestOptions, RetryDecision, RetryPolicy, parse_retry_after,
};

/// API client that executes calls with retries.
///
/// Each call runs its attempts strictly one after another. Between attempts
/// the client consults its [`RetryPolicy`] and suspends on the sleeper; the
/// per-attempt deadline is the only cancellation mechanism.
///
/// The client holds only immutable configuration, so it can be shared
/// (e.g. behind an `Arc`) by any number of concurrent calls.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper implementation for retry delays (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```no_run
/// use checkout_client::config::ClientConfig;
/// use checkout_client::transport::{ApiClient, ReqwestClient, RequestOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::builder("sk_test_123").build()?;
/// let client = ApiClient::new(ReqwestClient::new(), config);
///
/// let options = RequestOptions::new().with_idempotency_key("order-1001");
/// let session: serde_json::Value = client
///     .post("/v1/checkout/sessions", &serde_json::json!({"amount": 1200}), &options)
///     .await?;
/// println!("{session}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApiClient<H, S = TokioSleeper> {
    http: H,
    sleeper: S,
    config: ClientConfig,
    retry_policy: RetryPolicy,
}

impl<H> ApiClient<H, TokioSleeper> {
    /// Creates a client with the default retry policy and [`TokioSleeper`].
    #[must_use]
    pub fn new(http: H, config: ClientConfig) -> Self {
        Self {
            http,
            sleeper: TokioSleeper,
            config,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl<H, S> ApiClient<H, S> {
    /// Sets a custom sleeper for retry delays.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> ApiClient<H, S2> {
        ApiClient {
            http: self.http,
            sleeper,
            config: self.config,
            retry_policy: self.retry_policy,
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

/// Why a single attempt did not produce a usable response.
enum AttemptFailure {
    Status(HttpResponse),
    Transport(HttpError),
}

impl AttemptFailure {
    fn class(&self) -> FailureClass {
        match self {
            Self::Status(response) => {
                FailureClass::from_status(response.status).unwrap_or(FailureClass::ClientError)
            }
            // Configuration problem, retrying cannot help
            Self::Transport(HttpError::InvalidUrl(_)) => FailureClass::ClientError,
            Self::Transport(HttpError::Connection(_) | HttpError::Timeout) => {
                FailureClass::NetworkOrTimeout
            }
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status(response) => response
                .header_str(http::header::RETRY_AFTER.as_str())
                .and_then(parse_retry_after),
            Self::Transport(_) => None,
        }
    }

    fn into_error(self, class: FailureClass, url: &Url, ctx: &AttemptContext) -> Error {
        match self {
            Self::Status(response) if class == FailureClass::ServerError => {
                Error::connection_from_response(&response, ctx.request_id(), ctx.attempts_made())
            }
            Self::Status(response) => Error::from_response(&response, ctx.request_id()),
            Self::Transport(HttpError::InvalidUrl(reason)) => Error::InvalidUrl {
                url: url.to_string(),
                reason,
            },
            Self::Transport(e) => Error::Connection {
                details: ErrorDetails::new(e.to_string()).with_request_id(ctx.request_id()),
                attempts: ctx.attempts_made(),
            },
        }
    }
}

impl<H: HttpClient, S: Sleeper> ApiClient<H, S> {
    /// Executes one logical API call.
    ///
    /// Each attempt gets a fresh request id; the idempotency key from
    /// `options` is sent unchanged on every attempt. A 2xx response is
    /// decoded as JSON into `T` (an empty body decodes as `null`). Failures
    /// are retried per the [`RetryPolicy`]; only the final outcome is returned.
    ///
    /// # Errors
    ///
    /// - 4xx responses map to their specific kinds immediately, without retry
    /// - [`Error::RateLimit`] once 429 retries are exhausted
    /// - [`Error::Connection`] once network, timeout or 5xx retries are exhausted
    /// - [`Error::Api`] for unexpected statuses or an undecodable 2xx body
    /// - [`Error::InvalidUrl`] if `path` cannot be resolved against the host
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: http::Method,
        path: &str,
        body: Option<&serde_json::Value>,
        options: &RequestOptions,
    ) -> Result<T, Error> {
        let url = self.resolve_url(path)?;
        let body = body.map(|value| value.to_string().into_bytes());
        let timeout = options.timeout.unwrap_or_else(|| self.config.timeout());
        let mut ctx = AttemptContext::new(
            options
                .max_retries
                .unwrap_or_else(|| self.config.max_retries()),
            options.idempotency_key.clone(),
        );

        loop {
            ctx.begin_attempt();
            let request = self.build_request(&method, &url, body.as_deref(), &ctx)?;

            tracing::debug!(
                %method,
                path,
                attempt = ctx.attempt(),
                request_id = ctx.request_id(),
                "Sending API request"
            );

            let failure = match self.send_once(request, timeout).await {
                Ok(response) if response.is_success() => {
                    return decode(&response, ctx.request_id());
                }
                Ok(response) => AttemptFailure::Status(response),
                Err(e) => AttemptFailure::Transport(e),
            };

            let class = failure.class();
            match self.retry_policy.decide(
                ctx.attempt(),
                ctx.max_retries(),
                class,
                failure.retry_after(),
            ) {
                RetryDecision::Retry(delay) => {
                    tracing::warn!(
                        %method,
                        path,
                        attempt = ctx.attempt(),
                        failure = class.as_str(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "API request failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    ctx.advance();
                }
                RetryDecision::Stop => {
                    let error = failure.into_error(class, &url, &ctx);
                    tracing::debug!(
                        %method,
                        path,
                        attempts = ctx.attempts_made(),
                        kind = %error.kind(),
                        "API request failed"
                    );
                    return Err(error);
                }
            }
        }
    }

    /// Executes a GET request.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T, Error> {
        self.execute(http::Method::GET, path, None, options).await
    }

    /// Executes a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
        options: &RequestOptions,
    ) -> Result<T, Error> {
        self.execute(http::Method::POST, path, Some(body), options)
            .await
    }

    /// Executes a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T, Error> {
        self.execute(http::Method::DELETE, path, None, options)
            .await
    }

    /// Resolves `path` against the configured host.
    ///
    /// The path is always joined as a relative reference, so a first segment
    /// like `sessions:search` is not read as a scheme. Absolute URLs and
    /// paths whose `..` segments climb above the host's base path are
    /// rejected.
    fn resolve_url(&self, path: &str) -> Result<Url, Error> {
        let host = self.config.host();
        let invalid = |reason: String| Error::InvalidUrl {
            url: path.to_string(),
            reason,
        };

        if Url::parse(path).is_ok_and(|url| url.has_host()) {
            return Err(invalid(
                "path must be relative to the configured host".to_string(),
            ));
        }

        let url = host
            .join(&format!("./{}", path.trim_start_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;

        if url.origin() != host.origin() || !url.path().starts_with(host.path()) {
            return Err(invalid(format!(
                "path must stay under the configured host {host}"
            )));
        }
        Ok(url)
    }

    /// Builds the physical request for the current attempt.
    fn build_request(
        &self,
        method: &http::Method,
        url: &Url,
        body: Option<&[u8]>,
        ctx: &AttemptContext,
    ) -> Result<HttpRequest, Error> {
        let mut request = HttpRequest::new(method.clone(), url.clone());
        request.headers = self.config.default_headers().clone();
        request
            .headers
            .insert(REQUEST_ID_HEADER, header_value("request_id", ctx.request_id())?);

        if let Some(key) = ctx.idempotency_key() {
            request
                .headers
                .insert(IDEMPOTENCY_KEY_HEADER, header_value("idempotency_key", key)?);
        }

        if let Some(body) = body {
            request.body = Some(body.to_vec());
        }

        Ok(request)
    }

    /// Sends one attempt, bounded by the per-attempt deadline.
    async fn send_once(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, HttpError> {
        tokio::time::timeout(timeout, self.http.request(request))
            .await
            .unwrap_or(Err(HttpError::Timeout))
    }
}

fn header_value(param: &str, value: &str) -> Result<http::HeaderValue, Error> {
    http::HeaderValue::from_str(value).map_err(|e| Error::InvalidRequest {
        details: ErrorDetails::new(format!("{param} is not a valid header value: {e}")),
        param: Some(param.to_string()),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse, local_request_id: &str) -> Result<T, Error> {
    let body: &[u8] = if response.body.is_empty() {
        b"null"
    } else {
        &response.body
    };

    serde_json::from_slice(body).map_err(|e| {
        Error::Api(
            ErrorDetails::new(format!("Invalid JSON in response body: {e}"))
                .with_status(response.status)
                .with_request_id(response.request_id().unwrap_or(local_request_id)),
        )
    })
}

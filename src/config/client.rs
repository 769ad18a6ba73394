//! Immutable client configuration.

use std::fmt;
use std::time::Duration;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue};
use url::Url;

use crate::transport::API_VERSION_HEADER;

use super::ConfigError;
use super::defaults;

const JSON: &str = "application/json";

/// Settings shared by every call an [`ApiClient`] makes.
///
/// Built once through [`ClientConfig::builder`] and never mutated afterwards,
/// so one value can back any number of concurrent calls. The headers that do
/// not vary per attempt are computed at build time.
///
/// [`ApiClient`]: crate::transport::ApiClient
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    api_version: String,
    host: Url,
    timeout: Duration,
    max_retries: u32,
    default_headers: HeaderMap,
}

impl ClientConfig {
    /// Starts a builder with the given API key and default settings.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_key: api_key.into(),
            api_version: defaults::API_VERSION.to_string(),
            host: defaults::HOST.to_string(),
            timeout: defaults::timeout(),
            max_retries: defaults::MAX_RETRIES,
        }
    }

    /// Secret API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// API version sent with every request.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Base URL; always ends with `/` so relative paths join beneath it.
    #[must_use]
    pub const fn host(&self) -> &Url {
        &self.host
    }

    /// Per-attempt deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retries allowed after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Headers sent unchanged on every attempt.
    #[must_use]
    pub const fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_version", &self.api_version)
            .field("host", &self.host.as_str())
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Clone)]
pub struct ClientConfigBuilder {
    api_key: String,
    api_version: String,
    host: String,
    timeout: Duration,
    max_retries: u32,
}

impl ClientConfigBuilder {
    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the per-attempt deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry budget.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Validates the settings and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API key is empty or not a valid header value
    /// - The API version is empty or not a valid header value
    /// - The host is not an absolute `http`/`https` URL
    /// - The timeout is zero
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let api_key = self.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::InvalidApiKey {
                reason: "must not be empty".to_string(),
            });
        }
        let mut authorization = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            ConfigError::InvalidApiKey {
                reason: "contains characters not allowed in a header".to_string(),
            }
        })?;
        authorization.set_sensitive(true);

        let api_version = self.api_version.trim().to_string();
        if api_version.is_empty() {
            return Err(ConfigError::InvalidApiVersion {
                value: self.api_version,
                reason: "must not be empty".to_string(),
            });
        }
        let version_value =
            HeaderValue::from_str(&api_version).map_err(|e| ConfigError::InvalidApiVersion {
                value: api_version.clone(),
                reason: e.to_string(),
            })?;

        let host = parse_host(&self.host)?;

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(AUTHORIZATION, authorization);
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        default_headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        default_headers.insert(API_VERSION_HEADER, version_value);
        default_headers.insert(USER_AGENT, HeaderValue::from_static(defaults::USER_AGENT));

        Ok(ClientConfig {
            api_key,
            api_version,
            host,
            timeout: self.timeout,
            max_retries: self.max_retries,
            default_headers,
        })
    }
}

impl fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("api_key", &redact(&self.api_key))
            .field("api_version", &self.api_version)
            .field("host", &self.host)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Parses and normalizes an API base URL.
///
/// Only `http` and `https` are accepted. Query and fragment are not allowed,
/// and the path is given a trailing `/` so that joining a relative path
/// appends to it instead of replacing its last segment.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] if the value is not a usable base URL.
pub fn parse_host(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: value.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(value.trim()).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not contain a query or fragment"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn redact(key: &str) -> String {
    // Keep the mode prefix (e.g. `sk_test_`) visible for debugging
    key.rfind('_').map_or_else(
        || "***".to_string(),
        |idx| format!("{}***", &key[..=idx]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_uses_defaults() {
        let config = ClientConfig::builder("sk_test_123").build().unwrap();

        assert_eq!(config.api_key(), "sk_test_123");
        assert_eq!(config.api_version(), defaults::API_VERSION);
        assert_eq!(config.host().as_str(), "https://api.checkout-client.dev/");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries(), 2);
    }

    #[test]
    fn builder_overrides_every_field() {
        let config = ClientConfig::builder("sk_live_abc")
            .api_version("2025-01-01")
            .host("http://localhost:8080/api")
            .timeout(Duration::from_secs(5))
            .max_retries(0)
            .build()
            .unwrap();

        assert_eq!(config.api_version(), "2025-01-01");
        assert_eq!(config.host().as_str(), "http://localhost:8080/api/");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.max_retries(), 0);
    }

    #[test]
    fn default_headers_are_precomputed() {
        let config = ClientConfig::builder("sk_test_123").build().unwrap();
        let headers = config.default_headers();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk_test_123");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(API_VERSION_HEADER).unwrap(), "2024-06-01");
        assert!(
            headers
                .get(USER_AGENT)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("checkout-client/")
        );
    }

    #[test]
    fn empty_api_key_rejected() {
        let result = ClientConfig::builder("   ").build();
        assert!(matches!(result, Err(ConfigError::InvalidApiKey { .. })));
    }

    #[test]
    fn api_key_with_newline_rejected() {
        let result = ClientConfig::builder("sk_test\n123").build();
        assert!(matches!(result, Err(ConfigError::InvalidApiKey { .. })));
    }

    #[test]
    fn empty_api_version_rejected() {
        let result = ClientConfig::builder("sk_test_123").api_version("").build();
        assert!(matches!(result, Err(ConfigError::InvalidApiVersion { .. })));
    }

    #[test]
    fn zero_timeout_rejected() {
        let result = ClientConfig::builder("sk_test_123")
            .timeout(Duration::ZERO)
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "timeout",
                ..
            })
        ));
    }

    #[test]
    fn non_http_host_rejected() {
        for host in ["ftp://example.com", "not a url", "https://example.com/?a=1"] {
            let result = ClientConfig::builder("sk_test_123").host(host).build();
            assert!(
                matches!(result, Err(ConfigError::InvalidUrl { .. })),
                "{host}"
            );
        }
    }

    #[test]
    fn host_keeps_existing_trailing_slash() {
        let url = parse_host("https://example.com/v2/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/v2/");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ClientConfig::builder("sk_test_supersecret").build().unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("sk_test_***"));

        let builder = format!("{:?}", ClientConfig::builder("plainsecret"));
        assert!(!builder.contains("plainsecret"));
    }
}

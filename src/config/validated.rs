//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use super::cli::Cli;
use super::client::{ClientConfig, parse_host};
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// The API key and webhook secret stay optional here: only the subcommands
/// that need them ask for them, through [`client_config`](Self::client_config)
/// and [`webhook_secret`](Self::webhook_secret).
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
pub struct ValidatedConfig {
    /// Secret API key, if configured
    pub api_key: Option<String>,

    /// API version sent with every request
    pub api_version: String,

    /// API base URL (normalized with a trailing `/`)
    pub host: Url,

    /// Per-attempt timeout
    pub timeout: Duration,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// Endpoint signing secret, if configured
    pub webhook_secret: Option<String>,

    /// Replay tolerance for webhook verification
    pub webhook_tolerance: Duration,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ host: {}, api_version: {}, timeout: {}s, max_retries: {}, \
             api_key: {}, webhook_secret: {}, webhook_tolerance: {}s }}",
            self.host,
            self.api_version,
            self.timeout.as_secs(),
            self.max_retries,
            if self.api_key.is_some() { "set" } else { "unset" },
            if self.webhook_secret.is_some() { "set" } else { "unset" },
            self.webhook_tolerance.as_secs(),
        )
    }
}

impl fmt::Debug for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The host is not an `http`/`https` URL
    /// - The API version is empty
    /// - The timeout is zero
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let client = toml.map(|t| &t.client);
        let webhook = toml.map(|t| &t.webhook);

        let host = Self::resolve_host(cli, toml)?;
        let api_version = Self::resolve_api_version(cli, toml)?;
        let timeout = Self::resolve_timeout(cli, toml)?;

        // Priority: CLI explicit > TOML > default
        let max_retries = cli
            .max_retries
            .or_else(|| client.and_then(|c| c.max_retries))
            .unwrap_or(defaults::MAX_RETRIES);

        let webhook_tolerance = webhook
            .and_then(|w| w.tolerance)
            .map_or_else(defaults::webhook_tolerance, Duration::from_secs);

        Ok(Self {
            api_key: non_empty(cli.api_key.as_deref())
                .or_else(|| non_empty(client.and_then(|c| c.api_key.as_deref()))),
            api_version,
            host,
            timeout,
            max_retries,
            webhook_secret: non_empty(webhook.and_then(|w| w.secret.as_deref())),
            webhook_tolerance,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path. Otherwise
    /// the per-user file from [`default_config_path`] is used when it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let path = cli
            .config
            .clone()
            .or_else(|| default_config_path().filter(|p| p.is_file()));

        let toml = if let Some(ref path) = path {
            tracing::debug!(path = %path.display(), "Loading config file");
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Builds the API client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] if no API key is configured,
    /// or a validation error if the key cannot be used.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ConfigError::missing(
                field::API_KEY,
                "Use --api-key or set client.api_key in config file",
            )
        })?;

        ClientConfig::builder(api_key)
            .api_version(self.api_version.as_str())
            .host(self.host.as_str())
            .timeout(self.timeout)
            .max_retries(self.max_retries)
            .build()
    }

    /// Resolves the webhook signing secret, preferring `explicit` over the config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] if neither source provides one.
    pub fn webhook_secret(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        non_empty(explicit)
            .or_else(|| self.webhook_secret.clone())
            .ok_or_else(|| {
                ConfigError::missing(
                    field::WEBHOOK_SECRET,
                    "Use --secret or set webhook.secret in config file",
                )
            })
    }

    fn resolve_host(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        let host = cli
            .host
            .as_deref()
            .or_else(|| toml.and_then(|t| t.client.host.as_deref()))
            .unwrap_or(defaults::HOST);

        parse_host(host)
    }

    fn resolve_api_version(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let version = cli
            .api_version
            .as_deref()
            .or_else(|| toml.and_then(|t| t.client.api_version.as_deref()))
            .unwrap_or(defaults::API_VERSION)
            .trim();

        if version.is_empty() {
            return Err(ConfigError::InvalidApiVersion {
                value: version.to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(version.to_string())
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.client.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }
}

/// Returns the per-user config file location, if the platform has one.
///
/// This is `<config_dir>/checkout-client/config.toml`, e.g.
/// `~/.config/checkout-client/config.toml` on Linux.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join(defaults::CONFIG_DIR_NAME)
            .join(defaults::CONFIG_FILE_NAME)
    })
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

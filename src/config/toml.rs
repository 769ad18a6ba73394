//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// API client section
    #[serde(default)]
    pub client: ClientSection,

    /// Webhook verification section
    #[serde(default)]
    pub webhook: WebhookSection,
}

/// API client configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Secret API key
    pub api_key: Option<String>,

    /// API version sent in `X-Api-Version`
    pub api_version: Option<String>,

    /// API base URL
    pub host: Option<String>,

    /// Per-attempt timeout in seconds
    pub timeout: Option<u64>,

    /// Retries after the first attempt
    pub max_retries: Option<u32>,
}

/// Webhook verification section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Endpoint signing secret
    pub secret: Option<String>,

    /// Replay tolerance in seconds
    pub tolerance: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# checkout-client configuration file

[client]
# Secret API key (required for `request`)
# api_key = "sk_test_..."

# API version sent with every request (default: 2024-06-01)
# api_version = "2024-06-01"

# API base URL
# host = "https://api.checkout-client.dev"

# Per-attempt timeout in seconds (default: 30)
timeout = 30

# Retries after the first attempt (default: 2)
max_retries = 2

[webhook]
# Endpoint signing secret used by `verify`
# secret = "whsec_..."

# Maximum accepted event age in seconds (default: 300)
tolerance = 300
"#
    .to_string()
}

//! Configuration layer for checkout-client.
//!
//! This module provides:
//! - Immutable API client settings ([`ClientConfig`])
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from `--config`, or the per-user file
//!    from [`default_config_path`] when it exists
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The API key has no default. It is only required by subcommands that call
//! the API; see [`ValidatedConfig::client_config`].
//!
//! # TOML-Only Options
//!
//! `webhook.secret` and `webhook.tolerance` are read from the file; the
//! `verify` subcommand can override both with its own flags.

mod cli;
mod client;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod cli_tests;

pub use cli::{Cli, Command, MethodArg};
pub use client::{ClientConfig, ClientConfigBuilder, parse_host};
pub use error::{ConfigError, field};
pub use toml::{ClientSection, TomlConfig, WebhookSection, default_config_template};
pub use validated::{ValidatedConfig, default_config_path, write_default_config};

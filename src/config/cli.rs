//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// checkout-client: talk to the checkout API from the command line
///
/// Signs and verifies webhook payloads and sends API requests
/// through the retrying request pipeline.
#[derive(Debug, Parser)]
#[command(name = "checkout-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Secret API key
    #[arg(long = "api-key", global = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// API version sent with every request
    #[arg(long = "api-version", global = true)]
    pub api_version: Option<String>,

    /// Per-attempt timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Retries after the first attempt
    #[arg(long = "max-retries", global = true)]
    pub max_retries: Option<u32>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for checkout-client
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "checkout-client.toml")]
        output: PathBuf,
    },

    /// Print a signature header for a payload
    Sign {
        /// File containing the raw payload
        #[arg(long)]
        payload: PathBuf,

        /// Endpoint signing secret
        #[arg(long)]
        secret: String,

        /// Unix timestamp to sign with (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Verify a signed payload and print the decoded event
    Verify {
        /// File containing the raw payload
        #[arg(long)]
        payload: PathBuf,

        /// Value of the signature header
        #[arg(long)]
        header: String,

        /// Endpoint signing secret (falls back to webhook.secret)
        #[arg(long)]
        secret: Option<String>,

        /// Maximum accepted event age in seconds (falls back to webhook.tolerance)
        #[arg(long)]
        tolerance: Option<u64>,
    },

    /// Send an API request through the retrying pipeline
    Request {
        /// HTTP method
        #[arg(value_enum, ignore_case = true)]
        method: MethodArg,

        /// Path relative to the API host
        path: String,

        /// JSON request body
        #[arg(long)]
        data: Option<String>,

        /// Idempotency key sent unchanged on every attempt
        #[arg(long = "idempotency-key")]
        idempotency_key: Option<String>,
    },
}

/// HTTP method argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// GET
    #[value(name = "GET")]
    Get,
    /// POST
    #[value(name = "POST")]
    Post,
    /// PUT
    #[value(name = "PUT")]
    Put,
    /// PATCH
    #[value(name = "PATCH")]
    Patch,
    /// DELETE
    #[value(name = "DELETE")]
    Delete,
}

impl From<MethodArg> for http::Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Get => Self::GET,
            MethodArg::Post => Self::POST,
            MethodArg::Put => Self::PUT,
            MethodArg::Patch => Self::PATCH,
            MethodArg::Delete => Self::DELETE,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}

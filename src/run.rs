//! Subcommand execution logic.
//!
//! Each subcommand is a small function over library types so that it can be
//! exercised with mock clients and fixed clocks; [`execute`] wires them to
//! the real ones and prints results to stdout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use checkout_client::config::{Command, ConfigError, ValidatedConfig};
use checkout_client::error::Error as ApiError;
use checkout_client::time::{Clock, Sleeper, SystemClock};
use checkout_client::transport::{ApiClient, HttpClient, ReqwestClient, RequestOptions};
use checkout_client::webhook::{Webhook, generate_test_header};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration needed by the subcommand is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to read the payload file.
    #[error("Failed to read payload '{}': {source}", path.display())]
    PayloadRead {
        /// Path to the payload file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// `--data` is not valid JSON.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    /// The API call or webhook verification failed.
    #[error("[{kind}] {0}", kind = .0.kind())]
    Api(#[from] ApiError),

    /// The result could not be rendered as JSON.
    #[error("Failed to render output: {0}")]
    Output(#[source] serde_json::Error),
}

impl RunError {
    /// Returns true for errors caused by configuration rather than at runtime.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns the request id to report alongside the error, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Api(e) => e.request_id(),
            _ => None,
        }
    }
}

/// Executes a parsed subcommand and prints its result.
///
/// `init` is handled before configuration is loaded and is a no-op here.
///
/// # Errors
///
/// Returns the subcommand's failure; see [`RunError`].
///
/// # Coverage Note
///
/// This function is excluded from coverage because it performs real I/O.
#[cfg(not(tarpaulin_include))]
pub async fn execute(command: Command, config: &ValidatedConfig) -> Result<(), RunError> {
    match command {
        Command::Init { .. } => Ok(()),
        Command::Sign {
            payload,
            secret,
            timestamp,
        } => {
            let payload = read_payload(&payload)?;
            println!("{}", sign(&payload, &secret, timestamp, &SystemClock));
            Ok(())
        }
        Command::Verify {
            payload,
            header,
            secret,
            tolerance,
        } => {
            let payload = read_payload(&payload)?;
            let secret = config.webhook_secret(secret.as_deref())?;
            let tolerance = tolerance.map_or(config.webhook_tolerance, Duration::from_secs);
            let webhook = Webhook::new().with_tolerance(tolerance);

            println!("{}", verify(&webhook, &payload, &header, &secret)?);
            Ok(())
        }
        Command::Request {
            method,
            path,
            data,
            idempotency_key,
        } => {
            let client = ApiClient::new(ReqwestClient::new(), config.client_config()?);
            let output = request(
                &client,
                method.into(),
                &path,
                data.as_deref(),
                idempotency_key,
            )
            .await?;

            println!("{output}");
            Ok(())
        }
    }
}

/// Reads a raw payload file without any normalization.
fn read_payload(path: &Path) -> Result<Vec<u8>, RunError> {
    std::fs::read(path).map_err(|e| RunError::PayloadRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Builds a signature header, timestamped by `clock` unless `timestamp` is given.
fn sign(payload: &[u8], secret: &str, timestamp: Option<i64>, clock: &impl Clock) -> String {
    let timestamp = timestamp.unwrap_or_else(|| clock.unix_timestamp());
    generate_test_header(payload, secret, timestamp)
}

/// Verifies and decodes a delivery, returning the event as pretty JSON.
fn verify<C: Clock>(
    webhook: &Webhook<C>,
    payload: &[u8],
    header: &str,
    secret: &str,
) -> Result<String, RunError> {
    let event: checkout_client::webhook::Event = webhook
        .construct(payload, header, secret, None)
        .map_err(ApiError::from)?;

    tracing::info!(id = %event.id, event_type = %event.event_type, "Webhook verified");
    serde_json::to_string_pretty(&event).map_err(RunError::Output)
}

/// Sends one logical request and returns the response as pretty JSON.
async fn request<H: HttpClient, S: Sleeper>(
    client: &ApiClient<H, S>,
    method: http::Method,
    path: &str,
    data: Option<&str>,
    idempotency_key: Option<String>,
) -> Result<String, RunError> {
    let body = data
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .map_err(RunError::InvalidBody)?;

    let mut options = RequestOptions::new();
    options.idempotency_key = idempotency_key;

    let value: serde_json::Value = client
        .execute(method, path, body.as_ref(), &options)
        .await?;

    serde_json::to_string_pretty(&value).map_err(RunError::Output)
}

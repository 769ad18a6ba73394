//! Parsing of the webhook signature header.
//!
//! Format: comma-separated `key=value` pairs, e.g.
//! `t=1700000000,v1=5257a869...,v1=9c1f...`. `t` must appear exactly once;
//! `v1` may repeat while a signing secret is being rotated. Other keys are
//! ignored.

use std::fmt;
use std::str::FromStr;

use super::WebhookError;

/// Key of the timestamp field.
const TIMESTAMP_KEY: &str = "t";

/// Key of the HMAC-SHA256 signature scheme.
pub const SIGNATURE_SCHEME: &str = "v1";

/// Parsed signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

impl SignatureHeader {
    /// Creates a header from parts.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::MalformedHeader`] if `timestamp` is not positive
    /// or `signatures` is empty.
    pub fn new(timestamp: i64, signatures: Vec<String>) -> Result<Self, WebhookError> {
        if timestamp <= 0 {
            return Err(WebhookError::MalformedHeader(
                "timestamp must be a positive integer".to_string(),
            ));
        }
        if signatures.is_empty() {
            return Err(WebhookError::MalformedHeader(format!(
                "no {SIGNATURE_SCHEME} signatures found"
            )));
        }
        Ok(Self {
            timestamp,
            signatures,
        })
    }

    /// Parses a raw header value.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::MalformedHeader`] when the header is empty, the
    /// timestamp is missing, repeated or non-numeric, or no `v1` value exists.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        if header.trim().is_empty() {
            return Err(WebhookError::MalformedHeader("header is empty".to_string()));
        }

        let mut timestamp: Option<i64> = None;
        let mut signatures = Vec::new();

        for (key, value) in header
            .split(',')
            .filter_map(|part| part.split_once('='))
            .map(|(k, v)| (k.trim(), v.trim()))
        {
            match key {
                TIMESTAMP_KEY => {
                    if timestamp.is_some() {
                        return Err(WebhookError::MalformedHeader(
                            "timestamp appears more than once".to_string(),
                        ));
                    }
                    let parsed = value.parse::<i64>().map_err(|_| {
                        WebhookError::MalformedHeader(format!("invalid timestamp '{value}'"))
                    })?;
                    timestamp = Some(parsed);
                }
                SIGNATURE_SCHEME if !value.is_empty() => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| WebhookError::MalformedHeader("missing timestamp".to_string()))?;

        Self::new(timestamp, signatures)
    }

    /// Claimed signing time, in seconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Hex digests in header order.
    #[must_use]
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }
}

impl FromStr for SignatureHeader {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SignatureHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TIMESTAMP_KEY}={}", self.timestamp)?;
        for signature in &self.signatures {
            write!(f, ",{SIGNATURE_SCHEME}={signature}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed(header: &str) -> bool {
        matches!(
            SignatureHeader::parse(header),
            Err(WebhookError::MalformedHeader(_))
        )
    }

    #[test]
    fn parses_single_signature() {
        let header = SignatureHeader::parse("t=1700000000,v1=abc123").unwrap();

        assert_eq!(header.timestamp(), 1_700_000_000);
        assert_eq!(header.signatures(), ["abc123"]);
    }

    #[test]
    fn parses_multiple_signatures_in_order() {
        let header = SignatureHeader::parse("t=10,v1=first,v1=second").unwrap();
        assert_eq!(header.signatures(), ["first", "second"]);
    }

    #[test]
    fn ignores_unknown_keys_and_whitespace() {
        let header = SignatureHeader::parse(" t=10 , v0=legacy, v1=abc ,garbage").unwrap();

        assert_eq!(header.timestamp(), 10);
        assert_eq!(header.signatures(), ["abc"]);
    }

    #[test]
    fn field_order_does_not_matter() {
        let header = SignatureHeader::parse("v1=abc,t=10").unwrap();
        assert_eq!(header.timestamp(), 10);
    }

    #[test]
    fn rejects_empty_header() {
        assert!(malformed(""));
        assert!(malformed("   "));
    }

    #[test]
    fn rejects_missing_timestamp() {
        assert!(malformed("v1=abc"));
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        assert!(malformed("t=yesterday,v1=abc"));
        assert!(malformed("t=,v1=abc"));
    }

    #[test]
    fn rejects_non_positive_timestamp() {
        assert!(malformed("t=0,v1=abc"));
        assert!(malformed("t=-5,v1=abc"));
    }

    #[test]
    fn rejects_repeated_timestamp() {
        assert!(malformed("t=10,t=11,v1=abc"));
    }

    #[test]
    fn rejects_missing_signatures() {
        assert!(malformed("t=10"));
        assert!(malformed("t=10,v0=legacy"));
        assert!(malformed("t=10,v1="));
    }

    #[test]
    fn display_renders_wire_format() {
        let header = SignatureHeader::new(42, vec!["aa".into(), "bb".into()]).unwrap();
        assert_eq!(header.to_string(), "t=42,v1=aa,v1=bb");
        assert_eq!(header.to_string().parse::<SignatureHeader>().unwrap(), header);
    }
}

//! Tests for CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

use super::cli::{Cli, Command, MethodArg};

mod parsing {
    use super::*;

    #[test]
    fn parse_request_with_globals() {
        let cli = Cli::parse_from_iter([
            "checkout-client",
            "--api-key",
            "sk_test_123",
            "request",
            "POST",
            "/v1/checkout/sessions",
            "--data",
            r#"{"amount":1200}"#,
            "--idempotency-key",
            "order-1001",
        ]);

        assert_eq!(cli.api_key.as_deref(), Some("sk_test_123"));
        let Command::Request {
            method,
            path,
            data,
            idempotency_key,
        } = cli.command
        else {
            panic!("expected request command");
        };
        assert_eq!(method, MethodArg::Post);
        assert_eq!(path, "/v1/checkout/sessions");
        assert_eq!(data.as_deref(), Some(r#"{"amount":1200}"#));
        assert_eq!(idempotency_key.as_deref(), Some("order-1001"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from_iter([
            "checkout-client",
            "request",
            "GET",
            "/v1/customers",
            "--host",
            "http://localhost:8080",
            "--api-version",
            "2025-01-01",
            "--timeout",
            "5",
            "--max-retries",
            "0",
            "-v",
        ]);

        assert_eq!(cli.host.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cli.api_version.as_deref(), Some("2025-01-01"));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.max_retries, Some(0));
        assert!(cli.verbose);
    }

    #[test]
    fn method_is_case_insensitive() {
        for (raw, expected) in [
            ("get", MethodArg::Get),
            ("Post", MethodArg::Post),
            ("PUT", MethodArg::Put),
            ("patch", MethodArg::Patch),
            ("delete", MethodArg::Delete),
        ] {
            let cli = Cli::parse_from_iter(["checkout-client", "request", raw, "/v1/x"]);
            let Command::Request { method, .. } = cli.command else {
                panic!("expected request command");
            };
            assert_eq!(method, expected, "{raw}");
        }
    }

    #[test]
    fn method_arg_converts_to_http_method() {
        assert_eq!(http::Method::from(MethodArg::Get), http::Method::GET);
        assert_eq!(http::Method::from(MethodArg::Delete), http::Method::DELETE);
    }

    #[test]
    fn parse_sign_command() {
        let cli = Cli::parse_from_iter([
            "checkout-client",
            "sign",
            "--payload",
            "event.json",
            "--secret",
            "whsec_test",
            "--timestamp",
            "1700000000",
        ]);

        let Command::Sign {
            payload,
            secret,
            timestamp,
        } = cli.command
        else {
            panic!("expected sign command");
        };
        assert_eq!(payload, PathBuf::from("event.json"));
        assert_eq!(secret, "whsec_test");
        assert_eq!(timestamp, Some(1_700_000_000));
    }

    #[test]
    fn parse_verify_command() {
        let cli = Cli::parse_from_iter([
            "checkout-client",
            "verify",
            "--payload",
            "event.json",
            "--header",
            "t=1700000000,v1=abc",
            "--tolerance",
            "60",
        ]);

        let Command::Verify {
            payload,
            header,
            secret,
            tolerance,
        } = cli.command
        else {
            panic!("expected verify command");
        };
        assert_eq!(payload, PathBuf::from("event.json"));
        assert_eq!(header, "t=1700000000,v1=abc");
        assert!(secret.is_none());
        assert_eq!(tolerance, Some(60));
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from_iter(["checkout-client", "-c", "custom.toml", "init"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}

mod init_command {
    use super::*;

    #[test]
    fn init_uses_default_output() {
        let cli = Cli::parse_from_iter(["checkout-client", "init"]);

        let Command::Init { output } = cli.command else {
            panic!("expected init command");
        };
        assert_eq!(output, PathBuf::from("checkout-client.toml"));
    }

    #[test]
    fn init_with_custom_output() {
        let cli = Cli::parse_from_iter(["checkout-client", "init", "--output", "my.toml"]);

        let Command::Init { output } = cli.command else {
            panic!("expected init command");
        };
        assert_eq!(output, PathBuf::from("my.toml"));
    }
}

mod rejection {
    use super::*;

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["checkout-client"]).is_err());
    }

    #[test]
    fn unknown_method_rejected() {
        assert!(Cli::try_parse_from(["checkout-client", "request", "TRACE", "/v1/x"]).is_err());
    }

    #[test]
    fn sign_requires_secret() {
        assert!(Cli::try_parse_from(["checkout-client", "sign", "--payload", "p.json"]).is_err());
    }

    #[test]
    fn non_numeric_timeout_rejected() {
        assert!(
            Cli::try_parse_from(["checkout-client", "--timeout", "soon", "init"]).is_err()
        );
    }
}

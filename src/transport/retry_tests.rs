//! Tests for `RetryPolicy` and failure classification.

use super::retry::parse_retry_after;
use super::{FailureClass, RetryDecision, RetryPolicy};
use std::time::Duration;

mod retry_policy_defaults {
    use super::*;

    #[test]
    fn new_creates_policy_with_defaults() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.initial_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert!((policy.multiplier - 2.0).abs() < f64::EPSILON);
        assert_eq!(policy.default_retry_after, Duration::from_secs(1));
    }

    #[test]
    fn default_trait_matches_new() {
        assert_eq!(RetryPolicy::new(), RetryPolicy::default());
    }
}

mod retry_policy_builder {
    use super::*;

    #[test]
    fn builder_chains_correctly() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(5))
            .with_multiplier(3.0)
            .with_default_retry_after(Duration::from_secs(4));

        assert_eq!(policy.initial_delay, Duration::from_millis(100));
        assert_eq!(policy.max_delay, Duration::from_secs(5));
        assert!((policy.multiplier - 3.0).abs() < f64::EPSILON);
        assert_eq!(policy.default_retry_after, Duration::from_secs(4));
    }

    #[test]
    #[should_panic(expected = "multiplier must be positive")]
    fn with_multiplier_zero_panics() {
        let _ = RetryPolicy::new().with_multiplier(0.0);
    }
}

mod failure_class {
    use super::*;
    use http::StatusCode;

    #[test]
    fn success_is_not_a_failure() {
        assert_eq!(FailureClass::from_status(StatusCode::OK), None);
        assert_eq!(FailureClass::from_status(StatusCode::NO_CONTENT), None);
    }

    #[test]
    fn plain_4xx_is_client_error() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::CONFLICT,
        ] {
            assert_eq!(
                FailureClass::from_status(status),
                Some(FailureClass::ClientError),
                "{status}"
            );
        }
    }

    #[test]
    fn status_429_is_rate_limited() {
        assert_eq!(
            FailureClass::from_status(StatusCode::TOO_MANY_REQUESTS),
            Some(FailureClass::RateLimited)
        );
    }

    #[test]
    fn status_5xx_is_server_error() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert_eq!(
                FailureClass::from_status(status),
                Some(FailureClass::ServerError)
            );
        }
    }

    #[test]
    fn redirect_is_terminal_client_error() {
        assert_eq!(
            FailureClass::from_status(StatusCode::FOUND),
            Some(FailureClass::ClientError)
        );
    }
}

mod decide {
    use super::*;

    #[test]
    fn client_error_never_retries() {
        let policy = RetryPolicy::new();

        for attempt in 0..3 {
            assert_eq!(
                policy.decide(attempt, 10, FailureClass::ClientError, None),
                RetryDecision::Stop
            );
        }
    }

    #[test]
    fn client_error_ignores_server_hint() {
        let policy = RetryPolicy::new();
        assert_eq!(
            policy.decide(
                0,
                5,
                FailureClass::ClientError,
                Some(Duration::from_secs(1))
            ),
            RetryDecision::Stop
        );
    }

    #[test]
    fn server_error_retries_until_budget_exhausted() {
        let policy = RetryPolicy::new();

        assert!(matches!(
            policy.decide(0, 2, FailureClass::ServerError, None),
            RetryDecision::Retry(_)
        ));
        assert!(matches!(
            policy.decide(1, 2, FailureClass::ServerError, None),
            RetryDecision::Retry(_)
        ));
        assert_eq!(
            policy.decide(2, 2, FailureClass::ServerError, None),
            RetryDecision::Stop
        );
    }

    #[test]
    fn network_failure_retries_like_server_error() {
        let policy = RetryPolicy::new();

        assert_eq!(
            policy.decide_with_jitter(0, 1, FailureClass::NetworkOrTimeout, None, 1.0),
            RetryDecision::Retry(Duration::from_millis(500))
        );
        assert_eq!(
            policy.decide_with_jitter(1, 1, FailureClass::NetworkOrTimeout, None, 1.0),
            RetryDecision::Stop
        );
    }

    #[test]
    fn zero_budget_stops_immediately() {
        let policy = RetryPolicy::new();

        for class in [
            FailureClass::RateLimited,
            FailureClass::ServerError,
            FailureClass::NetworkOrTimeout,
        ] {
            assert_eq!(policy.decide(0, 0, class, None), RetryDecision::Stop);
        }
    }

    #[test]
    fn rate_limited_uses_server_hint_over_backoff() {
        let policy = RetryPolicy::new();

        assert_eq!(
            policy.decide_with_jitter(
                3,
                5,
                FailureClass::RateLimited,
                Some(Duration::from_secs(2)),
                1.25
            ),
            RetryDecision::Retry(Duration::from_millis(2000))
        );
    }

    #[test]
    fn rate_limited_defaults_to_one_second() {
        let policy = RetryPolicy::new();

        assert_eq!(
            policy.decide(0, 2, FailureClass::RateLimited, None),
            RetryDecision::Retry(Duration::from_secs(1))
        );
    }

    #[test]
    fn sampled_delay_stays_within_jitter_bounds() {
        let policy = RetryPolicy::new();

        for _ in 0..200 {
            let RetryDecision::Retry(delay) = policy.decide(1, 3, FailureClass::ServerError, None)
            else {
                panic!("expected retry");
            };
            // base for attempt 1 is 1000ms
            assert!(delay >= Duration::from_millis(750), "{delay:?}");
            assert!(delay <= Duration::from_millis(1250), "{delay:?}");
        }
    }
}

mod backoff_delay {
    use super::*;

    #[test]
    fn doubles_each_retry_without_jitter() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.backoff_delay(0, 1.0), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(1, 1.0), Duration::from_millis(1000));
        assert_eq!(policy.backoff_delay(2, 1.0), Duration::from_millis(2000));
        assert_eq!(policy.backoff_delay(3, 1.0), Duration::from_millis(4000));
    }

    #[test]
    fn applies_jitter_factor() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.backoff_delay(0, 0.75), Duration::from_millis(375));
        assert_eq!(policy.backoff_delay(0, 1.25), Duration::from_millis(625));
    }

    #[test]
    fn capped_at_thirty_seconds() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.backoff_delay(6, 1.0), Duration::from_secs(30));
        assert_eq!(policy.backoff_delay(6, 1.25), Duration::from_secs(30));
        assert_eq!(policy.backoff_delay(40, 1.0), Duration::from_secs(30));
    }

    #[test]
    fn huge_retry_index_does_not_overflow() {
        let policy = RetryPolicy::new();
        assert_eq!(policy.backoff_delay(u32::MAX, 1.0), Duration::from_secs(30));
    }
}

mod retry_after {
    use super::*;

    #[test]
    fn parses_integer_seconds() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 10 "), Some(Duration::from_secs(10)));
    }

    #[test]
    fn parses_fractional_seconds() {
        assert_eq!(parse_retry_after("1.5"), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(parse_retry_after(""), None);
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after("NaN"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}

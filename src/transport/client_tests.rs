//! Tests for `ReqwestClient`.
//!
//! These tests cover construction and local failure classification only;
//! nothing here needs a reachable server.

use super::*;

mod reqwest_client {
    use super::*;

    #[test]
    fn new_creates_client() {
        let client = ReqwestClient::new();
        let _ = format!("{client:?}");
    }

    #[test]
    fn from_client_accepts_custom_client() {
        let custom = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap();
        let client = ReqwestClient::from_client(custom);

        let _ = format!("{client:?}");
    }

    #[test]
    fn client_implements_http_client() {
        fn assert_http_client<T: HttpClient + Clone>() {}
        assert_http_client::<ReqwestClient>();
    }

    #[tokio::test]
    async fn unreachable_host_is_connection_error() {
        // Port 9 on localhost is the discard service and is closed on test hosts.
        let url = url::Url::parse("http://127.0.0.1:9/v1/ping").unwrap();
        let result = ReqwestClient::new().request(HttpRequest::get(url)).await;

        assert!(matches!(result, Err(HttpError::Connection(_))));
    }
}

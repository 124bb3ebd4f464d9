//! Starts wiremock servers, skipping tests where sockets cannot be bound.
//!
//! Set `SUMMARIZE_REQUIRE_SOCKET_TESTS=1` to turn a skip into a failure.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_SOCKET_TESTS_ENV: &str = "SUMMARIZE_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_SOCKET_TESTS_ENV)
        .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Returns a running mock server, or `None` if the sandbox forbids sockets.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => Some(MockServer::builder().listener(listener).start().await),
        Err(error) => {
            assert!(
                !sockets_required(),
                "{REQUIRE_SOCKET_TESTS_ENV} is set but binding a socket failed: {error}"
            );
            eprintln!("skipping socket test: cannot bind 127.0.0.1 ({error})");
            None
        }
    }
}

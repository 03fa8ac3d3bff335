// Integration tests for the roster Data API client

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use brew_match::{RosterClient, UpstreamError};
use serde_json::Map;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::watch;

const EMPLOYEES_PATH: &str = "/api/v1/data/employees-for-matching";
const HEALTH_PATH: &str = "/api/v1/data/health";

const ROSTER_BODY: &str = r#"{
    "employees": [
        {"id": 1, "displayName": "Ivan Ivanov", "department": "IT", "interests": ["coffee"]},
        {"id": 2, "displayName": "Petr Petrov", "department": "Analytics", "interests": ["coffee"]}
    ],
    "generated_at": "2025-06-01T10:00:00Z"
}"#;

/// Serves one scripted (status, body) response per connection, then keeps
/// answering with the last entry. Counts connections so tests can assert the
/// exact number of attempts.
async fn spawn_scripted_server(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind scripted server");
    let addr = listener.local_addr().expect("local addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            let (status, body) = responses
                .get(attempt)
                .copied()
                .unwrap_or_else(|| *responses.last().expect("non-empty script"));

            // Drain the request head before answering
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                match socket.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }

            let reason = if status < 400 { "OK" } else { "Server Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), hits)
}

#[tokio::test]
async fn test_fetch_roster_success_first_attempt() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", EMPLOYEES_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ROSTER_BODY)
        .create_async()
        .await;

    let client = RosterClient::new(server.url(), None, 3, 10);
    let roster = client.fetch_roster(&Map::new()).await.unwrap();

    assert_eq!(roster.employees.len(), 2);
    assert_eq!(roster.employees[0].display_name, "Ivan Ivanov");
    assert_eq!(roster.generated_at.as_deref(), Some("2025-06-01T10:00:00Z"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_roster_retries_then_succeeds() {
    let (url, hits) =
        spawn_scripted_server(vec![(500, "{}"), (500, "{}"), (200, ROSTER_BODY)]).await;

    let client = RosterClient::new(url, None, 3, 10);
    let roster = client.fetch_roster(&Map::new()).await.unwrap();

    assert_eq!(roster.employees.len(), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_fetch_roster_exhausts_retries() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", EMPLOYEES_PATH)
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let client = RosterClient::new(server.url(), None, 3, 10);
    let err = client.fetch_roster(&Map::new()).await.unwrap_err();

    match err {
        UpstreamError::Unavailable { attempts, last_error } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("503"));
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_backoff_grows_exponentially() {
    // Two failures before success: waits of base and 2x base must elapse
    let (url, hits) =
        spawn_scripted_server(vec![(500, "{}"), (500, "{}"), (200, ROSTER_BODY)]).await;

    let base_ms = 100u64;
    let client = RosterClient::new(url, None, 3, base_ms);

    let started = Instant::now();
    let roster = client.fetch_roster(&Map::new()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(roster.employees.len(), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert!(
        elapsed >= Duration::from_millis(base_ms + 2 * base_ms - 20),
        "expected at least {}ms of backoff, saw {:?}",
        3 * base_ms,
        elapsed
    );
}

#[tokio::test]
async fn test_no_backoff_after_final_failure() {
    // With a large base backoff, exhaustion must not wait after the last attempt
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", EMPLOYEES_PATH)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let client = RosterClient::new(server.url(), None, 1, 60_000);

    let started = Instant::now();
    let err = client.fetch_roster(&Map::new()).await.unwrap_err();

    assert!(matches!(err, UpstreamError::Unavailable { attempts: 1, .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_shutdown_aborts_backoff() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", EMPLOYEES_PATH)
        .with_status(500)
        .create_async()
        .await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let client = RosterClient::new(server.url(), None, 3, 30_000).with_shutdown(shutdown_rx);

    let handle = tokio::spawn(async move { client.fetch_roster(&Map::new()).await });

    // Let the first attempt fail and the backoff begin, then signal shutdown
    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown_tx.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("fetch must abort promptly")
        .expect("task must not panic");

    assert!(matches!(result, Err(UpstreamError::Interrupted)));
}

#[tokio::test]
async fn test_auth_header_attached_when_token_present() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", EMPLOYEES_PATH)
        .match_header("authorization", "Service token-x")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(ROSTER_BODY)
        .create_async()
        .await;

    let client = RosterClient::new(server.url(), Some("token-x".to_string()), 3, 10);
    let roster = client.fetch_roster(&Map::new()).await.unwrap();

    assert_eq!(roster.employees.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_auth_header_absent_without_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", EMPLOYEES_PATH)
        .match_header("authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_body(ROSTER_BODY)
        .create_async()
        .await;

    let client = RosterClient::new(server.url(), None, 3, 10);
    client.fetch_roster(&Map::new()).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_params_forwarded_as_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", EMPLOYEES_PATH)
        .match_body(mockito::Matcher::JsonString(
            r#"{"department": "IT", "only_active": true}"#.to_string(),
        ))
        .with_status(200)
        .with_body(ROSTER_BODY)
        .create_async()
        .await;

    let mut params = Map::new();
    params.insert("department".to_string(), serde_json::json!("IT"));
    params.insert("only_active".to_string(), serde_json::json!(true));

    let client = RosterClient::new(server.url(), None, 3, 10);
    client.fetch_roster(&params).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_health_check_healthy() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", HEALTH_PATH)
        .match_header("authorization", "Service token-x")
        .with_status(200)
        .with_body(r#"{"status": "ok"}"#)
        .create_async()
        .await;

    let client = RosterClient::new(server.url(), Some("token-x".to_string()), 3, 10);
    assert!(client.health_check().await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_health_check_non_2xx_is_unhealthy() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", HEALTH_PATH)
        .with_status(500)
        .create_async()
        .await;

    let client = RosterClient::new(server.url(), None, 3, 10);
    assert!(!client.health_check().await);
}

#[tokio::test]
async fn test_health_check_unreachable_is_unhealthy() {
    // Nothing listens on this port
    let client = RosterClient::new("http://127.0.0.1:9", None, 3, 10);
    assert!(!client.health_check().await);
}

#[tokio::test]
async fn test_malformed_roster_body_consumes_attempts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", EMPLOYEES_PATH)
        .with_status(200)
        .with_body("not json")
        .expect(2)
        .create_async()
        .await;

    let client = RosterClient::new(server.url(), None, 2, 10);
    let err = client.fetch_roster(&Map::new()).await.unwrap_err();

    match err {
        UpstreamError::Unavailable { attempts, last_error } => {
            assert_eq!(attempts, 2);
            assert!(last_error.contains("decode"));
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
    mock.assert_async().await;
}

//! Integration tests for quote sources against a local HTTP responder

use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use stock_feed::clock::ManualClock;
use stock_feed::feed::{FeedError, QuoteSource, RestQuoteClient};
use stock_feed::polling::{FeedSettings, QuoteOrigin, SymbolFeed};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single canned HTTP response
///
/// Returns the base URL and a handle resolving to the request line received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (format!("http://{}", addr), handle)
}

/// Base URL of a port nothing listens on
async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn client(base_url: &str) -> RestQuoteClient {
    RestQuoteClient::new(base_url, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_fetch_realtime_payload() {
    let body = r#"{
        "symbol": "GOOGL",
        "price": 176.12,
        "change": 0.7,
        "changePercent": 0.4,
        "volume": 17250000,
        "high": 177.01,
        "low": 175.33,
        "previousClose": 175.42,
        "timestamp": 1705312800000
    }"#;
    let (url, request) = serve_once("200 OK", body).await;

    let quote = client(&url).fetch("GOOGL").await.unwrap();
    assert_eq!(quote.symbol, "GOOGL");
    assert_eq!(quote.price, 176.12);
    assert_eq!(quote.change_percent, 0.4);
    assert_eq!(quote.volume, 17_250_000);
    assert_eq!(
        quote.timestamp,
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    );
    assert_eq!(request.await.unwrap(), "GET /api/stocks/GOOGL/realtime HTTP/1.1");
}

#[tokio::test]
async fn test_reserved_characters_stay_in_symbol_segment() {
    let (url, request) = serve_once("200 OK", r#"{"price": 412.5}"#).await;

    let quote = client(&url).fetch("BRK#B").await.unwrap();
    assert_eq!(quote.symbol, "BRK#B");
    assert_eq!(quote.price, 412.5);
    assert_eq!(request.await.unwrap(), "GET /api/stocks/BRK%23B/realtime HTTP/1.1");
}

#[tokio::test]
async fn test_slash_in_symbol_is_encoded() {
    let (url, request) = serve_once("200 OK", r#"{"price": 1.0}"#).await;

    client(&url).fetch("A/B").await.unwrap();
    assert_eq!(request.await.unwrap(), "GET /api/stocks/A%2FB/realtime HTTP/1.1");
}

#[tokio::test]
async fn test_missing_price_decodes_as_nan() {
    let (url, _) = serve_once("200 OK", r#"{"symbol": "CRCL", "volume": 900000}"#).await;

    let quote = client(&url).fetch("CRCL").await.unwrap();
    assert!(quote.price.is_nan());
    assert!(!quote.has_usable_price());
}

#[tokio::test]
async fn test_non_success_status() {
    let (url, _) = serve_once("503 Service Unavailable", r#"{"error": "down"}"#).await;

    match client(&url).fetch("GOOGL").await {
        Err(FeedError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.contains("down"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let (url, _) = serve_once("200 OK", "<html>oops</html>").await;

    assert!(matches!(
        client(&url).fetch("GOOGL").await,
        Err(FeedError::Decode(_))
    ));
}

#[tokio::test]
async fn test_connection_refused() {
    let url = refused_url().await;

    assert!(matches!(
        client(&url).fetch("GOOGL").await,
        Err(FeedError::Http(_))
    ));
}

#[tokio::test]
async fn test_unreachable_server_falls_back() {
    let url = refused_url().await;
    let feed = SymbolFeed::new(
        "GOOGL",
        Arc::new(client(&url)),
        FeedSettings::default(),
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        )),
        StdRng::seed_from_u64(4),
    );

    feed.refresh().await;

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.origin, Some(QuoteOrigin::Fallback));
    assert_eq!(snapshot.points.len(), 50);
    assert!((snapshot.current_price.unwrap() - 175.42).abs() < 5.0);
}

//! Integration tests for the measurement engine against a mock HTTP server
//!
//! Covers the transfer timer, the latency prober, catalog bootstrap and a
//! full orchestrated run, all without touching the real network.

use speedprobe::catalog::CatalogService;
use speedprobe::config::Config;
use speedprobe::error::AppError;
use speedprobe::{MeterClient, SpeedTest};
use std::time::Duration;
use wiremock::matchers::{body_bytes, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A download is timed and its bytes counted while streaming
#[tokio::test]
async fn download_counts_streamed_bytes() {
    let server = MockServer::start().await;
    let payload = vec![0xAB_u8; 1_000_000];

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
        .mount(&server)
        .await;

    let client = MeterClient::new();
    let sample = client
        .measure_download(&format!("{}/down", server.uri()), PROBE_TIMEOUT)
        .await;

    assert!(!sample.is_failure());
    assert_eq!(sample.bytes, 1_000_000);
    assert!(sample.elapsed_secs.is_finite());
    assert!(sample.elapsed_secs >= 0.0);
}

/// A non-2xx download yields the sentinel, not an error
#[tokio::test]
async fn download_non_success_status_is_sentinel() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = MeterClient::new();
    let sample = client
        .measure_download(&format!("{}/down", server.uri()), PROBE_TIMEOUT)
        .await;

    assert!(sample.is_failure());
    assert_eq!(sample.bytes, 0);
    assert!(sample.elapsed_secs.is_infinite());
}

/// A refused connection yields the sentinel
#[tokio::test]
async fn download_connection_refused_is_sentinel() {
    let client = MeterClient::new();
    let sample = client
        .measure_download("http://127.0.0.1:9/down", Duration::from_secs(1))
        .await;

    assert!(sample.is_failure());
}

/// The streamed upload body delivers exactly the declared payload
#[tokio::test]
async fn upload_streams_exact_payload() {
    let server = MockServer::start().await;
    let size: u64 = 150_000; // two full chunks plus a tail

    Mock::given(method("POST"))
        .and(path("/up"))
        .and(body_bytes(vec![0u8; size as usize]))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = MeterClient::new();
    let sample = client
        .measure_upload(&format!("{}/up", server.uri()), size, PROBE_TIMEOUT)
        .await;

    assert!(!sample.is_failure());
    assert_eq!(sample.bytes, size);
    assert!(sample.elapsed_secs.is_finite());
}

/// A rejected upload yields the sentinel
#[tokio::test]
async fn upload_non_success_status_is_sentinel() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = MeterClient::new();
    let sample = client
        .measure_upload(&format!("{}/up", server.uri()), 1024, PROBE_TIMEOUT)
        .await;

    assert!(sample.is_failure());
}

/// Latency over a healthy endpoint returns a plausible median
#[tokio::test]
async fn latency_healthy_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let client = MeterClient::new();
    let ms = client
        .measure_latency(&format!("{}/ping", server.uri()), PROBE_TIMEOUT, 3)
        .await;

    assert!(ms.is_finite());
    assert!(ms > 0.0);
    assert!(ms < 10_000.0);
}

/// Every attempt against an unreachable endpoint records the penalty
#[tokio::test]
async fn latency_unreachable_endpoint_is_penalty() {
    let client = MeterClient::new();
    let ms = client
        .measure_latency("http://127.0.0.1:9/ping", Duration::from_secs(1), 3)
        .await;

    assert_eq!(ms, 10_000.0);
}

/// A non-2xx latency response is still timed, not penalized
#[tokio::test]
async fn latency_http_error_is_not_penalized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = MeterClient::new();
    let ms = client
        .measure_latency(&format!("{}/ping", server.uri()), PROBE_TIMEOUT, 3)
        .await;

    assert!(ms < 10_000.0);
}

fn catalog_body(base: &str) -> String {
    format!(
        r#"{{
            "mid": "m-1", "lid": "l-1",
            "download": {{ "probes": [ {{ "url": "{base}/down" }} ] }},
            "upload":   {{ "probes": [ {{ "url": "{base}/up", "size": 150000 }} ] }},
            "latency":  {{ "probes": [ {{ "url": "{base}/ping" }} ] }}
        }}"#
    )
}

/// Catalog bootstrap parses the served document
#[tokio::test]
async fn catalog_fetch_and_parse() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/internet/api/v0/get-probes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(catalog_body(&server.uri())),
        )
        .mount(&server)
        .await;

    let catalog = CatalogService::new(&server.uri()).fetch().await.unwrap();

    assert_eq!(catalog.mid, "m-1");
    assert_eq!(catalog.lid, "l-1");
    assert_eq!(catalog.probe_count(), 3);
    assert_eq!(catalog.upload.probes[0].size, Some(150_000));
}

/// An HTTP 500 from the catalog service is a fatal catalog error
#[tokio::test]
async fn catalog_http_500_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/internet/api/v0/get-probes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = CatalogService::new(&server.uri()).fetch().await;
    assert!(matches!(result, Err(AppError::Catalog(_))));
}

/// An unparsable catalog document is a fatal invalid-catalog error
#[tokio::test]
async fn catalog_malformed_body_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/internet/api/v0/get-probes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let result = CatalogService::new(&server.uri()).fetch().await;
    assert!(matches!(result, Err(AppError::InvalidCatalog(_))));
}

/// Bootstrap failure propagates through SpeedTest::connect
#[tokio::test]
async fn connect_fails_loudly_on_broken_catalog() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/internet/api/v0/get-probes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = Config {
        base_url: server.uri(),
        ..Config::default()
    };

    let result = SpeedTest::connect(&config).await;
    assert!(matches!(result, Err(AppError::Catalog(_))));
}

/// Full orchestrated run against a healthy mock service
#[tokio::test]
async fn end_to_end_run_produces_positive_numbers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/internet/api/v0/get-probes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(catalog_body(&server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 500_000]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let config = Config {
        base_url: server.uri(),
        latency_attempts: 2,
        ..Config::default()
    };

    let engine = SpeedTest::connect(&config).await.unwrap();
    let result = engine.run(2).await.unwrap();

    assert!(result.download_mbps > 0.0);
    assert!(result.upload_mbps > 0.0);
    assert!(result.ping_ms.is_finite());
    assert!(result.ping_ms > 0.0);
}

/// A dead transfer probe degrades the numbers without failing the run
#[tokio::test]
async fn failing_probe_degrades_but_does_not_abort() {
    let server = MockServer::start().await;

    let body = format!(
        r#"{{
            "mid": "m-1", "lid": "l-1",
            "download": {{ "probes": [
                {{ "url": "{base}/down" }},
                {{ "url": "http://127.0.0.1:9/dead", "timeout": 1 }}
            ] }},
            "upload":   {{ "probes": [] }},
            "latency":  {{ "probes": [ {{ "url": "{base}/ping" }} ] }}
        }}"#,
        base = server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/internet/api/v0/get-probes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 100_000]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = Config {
        base_url: server.uri(),
        latency_attempts: 1,
        ..Config::default()
    };

    let engine = SpeedTest::connect(&config).await.unwrap();
    let result = engine.run(1).await.unwrap();

    // The healthy probe's bytes still count
    assert!(result.download_mbps > 0.0);
    assert!(result.ping_ms.is_finite());
}

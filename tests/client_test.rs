//! Mirakurun HTTP client tests against a local stub server

use axum::{http::StatusCode, routing::get, Router};
use mirakurun_exporter::config::MirakurunConfig;
use mirakurun_exporter::error::ExporterError;
use mirakurun_exporter::mirakurun::{MirakurunApi, MirakurunClient};

const TUNERS_JSON: &str = r#"[
  {
    "index": 0,
    "name": "PX4-S1",
    "types": ["BS", "CS"],
    "command": "recpt1 --device /dev/px4video0 <channel> - -",
    "pid": 4321,
    "users": [
      {
        "id": "127.0.0.1:53516",
        "priority": 0,
        "agent": "EPGStation",
        "streamInfo": {
          "0": {"packet": 1000, "drop": 1},
          "16": {"packet": 250, "drop": 0}
        }
      }
    ],
    "isAvailable": true,
    "isRemote": false,
    "isFree": false,
    "isUsing": true,
    "isFault": false
  }
]"#;

/// Serve `router` on an ephemeral port and return its base URL
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{}", addr)
}

fn client(url: &str) -> MirakurunClient {
    MirakurunClient::new(&MirakurunConfig {
        url: url.to_string(),
        request_timeout_seconds: 2,
    })
    .expect("valid client")
}

#[tokio::test]
async fn test_fetch_and_decode_tuners() {
    // Given: a server answering /api/tuners
    let url = serve(Router::new().route("/api/tuners", get(|| async { TUNERS_JSON }))).await;

    // When: fetching tuners
    let tuners = client(&url).get_tuners().await.expect("tuners");

    // Then: the payload is decoded, including the PID-keyed stream info
    assert_eq!(tuners.len(), 1);
    assert_eq!(tuners[0].name, "PX4-S1");
    assert!(tuners[0].is_using);
    let streams = tuners[0].users[0].stream_info.as_ref().expect("stream info");
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[&16].packet, 250);
}

#[tokio::test]
async fn test_base_url_with_trailing_slash() {
    let url = serve(Router::new().route(
        "/api/version",
        get(|| async { r#"{"current":"3.9.0","latest":"4.0.0"}"# }),
    ))
    .await;

    let version = client(&format!("{}/", url))
        .get_version()
        .await
        .expect("version");

    assert_eq!(version.current, "3.9.0");
    assert_eq!(version.latest, "4.0.0");
}

#[tokio::test]
async fn test_non_200_is_status_error() {
    let url = serve(Router::new().route(
        "/api/jobs",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
    ))
    .await;

    let err = client(&url).get_jobs().await.expect_err("503");

    match err {
        ExporterError::Status { path, status } => {
            assert_eq!(path, "/api/jobs");
            assert_eq!(status, 503);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_missing_endpoint_is_status_error() {
    let url = serve(Router::new()).await;

    let err = client(&url).get_channels().await.expect_err("404");

    assert!(matches!(err, ExporterError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let url = serve(Router::new().route("/api/status", get(|| async { "{not json" }))).await;

    let err = client(&url).get_status().await.expect_err("bad json");

    assert!(matches!(err, ExporterError::Json(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    // Bind and immediately drop a listener to get a closed port
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .get_programs()
        .await
        .expect_err("connection refused");

    assert!(matches!(err, ExporterError::Http(_)));
}

#[test]
fn test_empty_url_rejected() {
    let result = MirakurunClient::new(&MirakurunConfig {
        url: "  ".to_string(),
        request_timeout_seconds: 5,
    });

    assert!(matches!(result, Err(ExporterError::Config(_))));
}

#[test]
fn test_invalid_url_rejected() {
    for url in ["not a url", "mailto:someone@example.com"] {
        let result = MirakurunClient::new(&MirakurunConfig {
            url: url.to_string(),
            request_timeout_seconds: 5,
        });

        assert!(
            matches!(result, Err(ExporterError::Config(_))),
            "{} should be rejected",
            url
        );
    }
}

#[test]
fn test_valid_url_is_kept() {
    let client = client("http://mirakurun.local:40772");

    assert_eq!(client.base_url().host_str(), Some("mirakurun.local"));
    assert_eq!(client.base_url().port(), Some(40772));
}

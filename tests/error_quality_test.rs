//! Error message quality tests
//!
//! Error messages end up in logs and in the 500 body of `/metrics`, so they
//! must name the thing that went wrong.

use mirakurun_exporter::error::ExporterError;
use std::time::Duration;

#[test]
fn test_status_error_names_path_and_code() {
    let err = ExporterError::Status {
        path: "/api/tuners".to_string(),
        status: 502,
    };

    let msg = err.to_string();

    assert!(msg.contains("/api/tuners"));
    assert!(msg.contains("502"));
}

#[test]
fn test_label_cardinality_error_is_actionable() {
    let err = ExporterError::LabelCardinality {
        metric: "mirakurun_jobs_count".to_string(),
        expected: 1,
        actual: 3,
    };

    let msg = err.to_string();

    assert!(msg.contains("mirakurun_jobs_count"));
    assert!(msg.contains('1'));
    assert!(msg.contains('3'));
}

#[test]
fn test_collector_errors_name_the_collector() {
    assert_eq!(
        ExporterError::DuplicateCollector("jobs".to_string()).to_string(),
        "Collector already registered: jobs"
    );
    assert_eq!(
        ExporterError::UnknownCollector("cpu".to_string()).to_string(),
        "Unknown collector: cpu"
    );
    assert!(ExporterError::CollectorPanicked("tuners".to_string())
        .to_string()
        .contains("tuners"));
}

#[test]
fn test_timeout_error_includes_limit() {
    let msg = ExporterError::Timeout(Duration::from_millis(1500)).to_string();

    assert!(msg.contains("1.5s"));
}

#[test]
fn test_json_error_converts() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");

    let err: ExporterError = json_err.into();

    assert!(matches!(err, ExporterError::Json(_)));
    assert!(err.to_string().starts_with("JSON error"));
}

#[test]
fn test_errors_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync + 'static>() {}

    assert_send_sync::<ExporterError>();
}

use analytics_service::services::{process_payload, EventTally, TallySummary};
use analytics_service::{build_router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use service_core::events::PatientEvent;
use std::sync::Arc;
use tower::util::ServiceExt;

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn summary_reflects_consumed_events() {
    let tally = Arc::new(EventTally::new());
    for i in 0..3 {
        let event = PatientEvent::created(format!("p-{}", i), "Jane Doe", "jane@example.com");
        process_payload(&tally, Some(&event.to_bytes()));
    }
    process_payload(&tally, Some(b"\xff\xff\xff\xff"));

    let router = build_router(AppState { tally });
    let (status, body) = get(router, "/analytics/summary").await;

    assert_eq!(status, StatusCode::OK);
    let summary: TallySummary = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary.total_events, 3);
    assert_eq!(summary.events_by_type["PATIENT_CREATED"], 3);
    assert_eq!(summary.decode_failures, 1);
}

#[tokio::test]
async fn health_check_works() {
    let router = build_router(AppState {
        tally: Arc::new(EventTally::new()),
    });

    let (status, body) = get(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["service"], "analytics-service");
}

#[tokio::test]
async fn metrics_endpoint_exposes_consumer_counters() {
    let tally = Arc::new(EventTally::new());
    process_payload(
        &tally,
        Some(&PatientEvent::created("p-1", "Jane", "jane@example.com").to_bytes()),
    );
    let router = build_router(AppState { tally });

    let (status, body) = get(router, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body)
        .unwrap()
        .contains("analytics_events_consumed_total"));
}

#[tokio::test]
async fn empty_and_foreign_payloads_do_not_grow_the_summary() {
    let tally = Arc::new(EventTally::new());
    process_payload(&tally, Some(&[]));
    let mut foreign = PatientEvent::created("p-9", "Jane Doe", "jane@example.com");
    foreign.event_type = "PATIENT_DELETED".to_string();
    process_payload(&tally, Some(&foreign.to_bytes()));

    let router = build_router(AppState { tally });
    let (status, body) = get(router, "/analytics/summary").await;

    assert_eq!(status, StatusCode::OK);
    let summary: TallySummary = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary.decode_failures, 1);
    assert_eq!(summary.total_events, 1);
    assert_eq!(summary.events_by_type.len(), 1);
    assert_eq!(summary.events_by_type["UNKNOWN"], 1);
}

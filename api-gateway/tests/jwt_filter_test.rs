mod common;

use axum::http::StatusCode;
use common::{TestGateway, GOOD_TOKEN};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn missing_header_is_rejected_without_calling_auth() {
    let gateway = TestGateway::new().await;
    Mock::given(path("/validate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway.auth)
        .await;
    Mock::given(path("/patients"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway.patients)
        .await;

    let response = gateway.send("GET", "/api/patients", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected_without_calling_auth() {
    let gateway = TestGateway::new().await;
    Mock::given(path("/validate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway.auth)
        .await;

    let response = gateway
        .send("GET", "/api/patients", Some("Basic dXNlcjpwYXNz"), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_rejected_by_auth_is_unauthorized() {
    let gateway = TestGateway::new().await;
    gateway.accept_good_token().await;
    Mock::given(path("/patients"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway.patients)
        .await;

    let response = gateway
        .send("GET", "/api/patients", Some("Bearer forged"), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_server_error_is_unauthorized() {
    let gateway = TestGateway::new().await;
    Mock::given(method("GET"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&gateway.auth)
        .await;

    let response = gateway
        .send("GET", "/api/patients", Some(GOOD_TOKEN), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unreachable_auth_is_bad_gateway() {
    let gateway = TestGateway::with_unreachable_auth().await;

    let response = gateway
        .send("GET", "/api/patients", Some(GOOD_TOKEN), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn accepted_token_reaches_patient_service() {
    let gateway = TestGateway::new().await;
    gateway.accept_good_token().await;
    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&gateway.patients)
        .await;

    let response = gateway
        .send("GET", "/api/patients", Some(GOOD_TOKEN), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), serde_json::json!([]));
}

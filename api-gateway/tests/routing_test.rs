mod common;

use axum::http::StatusCode;
use common::{TestGateway, GOOD_TOKEN};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn auth_prefix_is_stripped_and_body_forwarded() {
    let gateway = TestGateway::new().await;
    let credentials = serde_json::json!({
        "email": "testuser@test.com",
        "password": "password123"
    });
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(&credentials))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "abc" })),
        )
        .expect(1)
        .mount(&gateway.auth)
        .await;

    let response = gateway
        .send("POST", "/auth/login", None, Some(credentials))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["token"], "abc");
}

#[tokio::test]
async fn upstream_status_and_headers_are_relayed() {
    let gateway = TestGateway::new().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("x-upstream", "auth")
                .set_body_json(serde_json::json!({ "error": "Invalid email or password" })),
        )
        .mount(&gateway.auth)
        .await;

    let response = gateway
        .send(
            "POST",
            "/auth/login",
            None,
            Some(serde_json::json!({ "email": "a@b.com", "password": "wrongpass" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers["x-upstream"], "auth");
    assert_eq!(response.json()["error"], "Invalid email or password");
}

#[tokio::test]
async fn patient_subpath_method_and_query_are_preserved() {
    let gateway = TestGateway::new().await;
    gateway.accept_good_token().await;
    let id = "7f1c9b1e-3c44-4a8e-9b7a-0f6f5f0d2a11";
    Mock::given(method("PUT"))
        .and(path(format!("/patients/{}", id)))
        .and(query_param("dryRun", "true"))
        .and(header("authorization", GOOD_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": id })))
        .expect(1)
        .mount(&gateway.patients)
        .await;

    let response = gateway
        .send(
            "PUT",
            &format!("/api/patients/{}?dryRun=true", id),
            Some(GOOD_TOKEN),
            Some(serde_json::json!({ "name": "Jane Doe" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["id"], id);
}

#[tokio::test]
async fn patient_delete_no_content_is_relayed() {
    let gateway = TestGateway::new().await;
    gateway.accept_good_token().await;
    Mock::given(method("DELETE"))
        .and(path("/patients/abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&gateway.patients)
        .await;

    let response = gateway
        .send("DELETE", "/api/patients/abc", Some(GOOD_TOKEN), None)
        .await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn api_docs_routes_map_to_openapi_paths() {
    let gateway = TestGateway::new().await;
    Mock::given(method("GET"))
        .and(path("/v3/api-docs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "info": { "title": "patient-service" } })),
        )
        .expect(1)
        .mount(&gateway.patients)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/api-docs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "info": { "title": "auth-service" } })),
        )
        .expect(1)
        .mount(&gateway.auth)
        .await;

    let patients = gateway.send("GET", "/api-docs/patients", None, None).await;
    let auth = gateway.send("GET", "/api-docs/auth", None, None).await;

    assert_eq!(patients.status, StatusCode::OK);
    assert_eq!(patients.json()["info"]["title"], "patient-service");
    assert_eq!(auth.json()["info"]["title"], "auth-service");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let gateway = TestGateway::with_unreachable_auth().await;

    let response = gateway
        .send(
            "POST",
            "/auth/login",
            None,
            Some(serde_json::json!({ "email": "a@b.com", "password": "password123" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn health_is_served_locally_and_unknown_paths_are_not_found() {
    let gateway = TestGateway::new().await;

    let health = gateway.send("GET", "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["service"], "api-gateway");

    let unknown = gateway.send("GET", "/billing/accounts", None, None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn encoded_question_mark_stays_in_the_path_segment() {
    let gateway = TestGateway::new().await;
    gateway.accept_good_token().await;
    Mock::given(method("GET"))
        .and(path("/patients/abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway.patients)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&gateway.patients)
        .await;

    let response = gateway
        .send("GET", "/api/patients/abc%3Fx=1", Some(GOOD_TOKEN), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let received = gateway.patients.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.path(), "/patients/abc%3Fx=1");
    assert_eq!(received[0].url.query(), None);
}

#[tokio::test]
async fn dot_segments_are_rejected_before_forwarding() {
    let gateway = TestGateway::new().await;
    gateway.accept_good_token().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway.patients)
        .await;

    for uri in ["/api/patients/../metrics", "/api/patients/%2e%2e/%2e%2e/metrics"] {
        let response = gateway.send("GET", uri, Some(GOOD_TOKEN), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn encoded_slash_is_forwarded_as_a_single_segment() {
    let gateway = TestGateway::new().await;
    gateway.accept_good_token().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&gateway.patients)
        .await;

    gateway
        .send("GET", "/api/patients/..%2F..%2Fmetrics", Some(GOOD_TOKEN), None)
        .await;

    let received = gateway.patients.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.path(), "/patients/..%2F..%2Fmetrics");
}

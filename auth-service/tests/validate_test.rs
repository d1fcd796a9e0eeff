mod common;

use axum::http::StatusCode;
use common::{TestApp, SEED_EMAIL, SEED_PASSWORD};

#[tokio::test]
async fn validate_accepts_issued_token() {
    let app = TestApp::new().await;
    let (_, body) = app.login(SEED_EMAIL, SEED_PASSWORD).await;
    let header = format!("Bearer {}", body["token"].as_str().unwrap());

    let (status, body) = app.request("GET", "/validate", Some(&header), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], SEED_EMAIL);
    assert_eq!(body["role"], "ADMIN");
    assert!(body["expires_at"].as_i64().unwrap() > chrono::Utc::now().timestamp());
}

#[tokio::test]
async fn validate_without_header_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, _) = app.request("GET", "/validate", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validate_requires_bearer_scheme() {
    let app = TestApp::new().await;
    let token = app.jwt.generate_token(SEED_EMAIL, "ADMIN").unwrap();

    let (status, _) = app
        .request("GET", "/validate", Some(&format!("Token {}", token)), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validate_rejects_garbage_and_expired_tokens() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request("GET", "/validate", Some("Bearer not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = TestApp::with_expiry(-1).await;
    let token = expired.jwt.generate_token(SEED_EMAIL, "ADMIN").unwrap();
    let (status, _) = app
        .request("GET", "/validate", Some(&format!("Bearer {}", token)), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn openapi_document_lists_auth_paths() {
    let app = TestApp::new().await;

    let (status, body) = app.request("GET", "/v3/api-docs", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/login"].is_object());
    assert!(body["paths"]["/validate"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

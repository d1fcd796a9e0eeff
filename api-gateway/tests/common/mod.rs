//! Shared helpers for api-gateway tests.
//!
//! Upstream services are wiremock servers; the router is driven with `oneshot`.

#![allow(dead_code)]

use api_gateway::config::UpstreamConfig;
use api_gateway::{build_router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::util::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GOOD_TOKEN: &str = "Bearer good-token";

pub struct TestGateway {
    pub router: Router,
    pub auth: MockServer,
    pub patients: MockServer,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

impl TestGateway {
    pub async fn new() -> Self {
        let auth = MockServer::start().await;
        let patients = MockServer::start().await;

        let state = AppState::new(UpstreamConfig::new(&auth.uri(), &patients.uri())).unwrap();

        Self {
            router: build_router(state),
            auth,
            patients,
        }
    }

    /// Gateway whose auth-service address refuses connections.
    pub async fn with_unreachable_auth() -> Self {
        let auth = MockServer::start().await;
        let patients = MockServer::start().await;

        let state =
            AppState::new(UpstreamConfig::new("http://127.0.0.1:1", &patients.uri())).unwrap();

        Self {
            router: build_router(state),
            auth,
            patients,
        }
    }

    /// Make auth-service accept `GOOD_TOKEN` and reject anything else.
    pub async fn accept_good_token(&self) {
        Mock::given(method("GET"))
            .and(path("/validate"))
            .and(header("authorization", GOOD_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "email": "testuser@test.com",
                "role": "ADMIN",
                "expires_at": 4_102_444_800i64
            })))
            .mount(&self.auth)
            .await;

        Mock::given(method("GET"))
            .and(path("/validate"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.auth)
            .await;
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

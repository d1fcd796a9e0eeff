//! Cross-service workflow integration tests library.
//!
//! Tests drive the platform through the gateway over HTTP and check the
//! billing side over gRPC. They expect every service to be running:
//!
//! ```bash
//! docker compose up -d
//! cargo test -p workflow-tests -- --ignored
//! ```

use anyhow::{anyhow, Result};
use serde_json::Value;
use service_core::grpc::proto::billing::BillingResponse;
use service_core::grpc::{BillingClient, BillingClientConfig};
use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Where the running services listen.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub gateway: String,
    pub billing_grpc: String,
    pub analytics: String,
}

impl ServiceEndpoints {
    pub fn from_env() -> Self {
        Self {
            gateway: env_or("GATEWAY_URL", "http://localhost:4004"),
            billing_grpc: env_or("BILLING_GRPC_ENDPOINT", "http://localhost:9001"),
            analytics: env_or("ANALYTICS_URL", "http://localhost:4002"),
        }
    }

    pub fn health_urls(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api-gateway", format!("{}/health", self.gateway)),
            ("auth", env_or("AUTH_HEALTH_URL", "http://localhost:4005/health")),
            ("patient", env_or("PATIENT_HEALTH_URL", "http://localhost:4000/health")),
            ("billing", env_or("BILLING_HEALTH_URL", "http://localhost:4001/health")),
            ("analytics", format!("{}/health", self.analytics)),
        ]
    }
}

/// Credentials of the account seeded into auth-service.
pub fn seeded_credentials() -> (String, String) {
    (
        env_or("WORKFLOW_USER_EMAIL", "testuser@test.com"),
        env_or("WORKFLOW_USER_PASSWORD", "password123"),
    )
}

pub struct WorkflowTestContext {
    pub endpoints: ServiceEndpoints,
    pub http: reqwest::Client,
    pub billing: BillingClient,
    pub token: Option<String>,
}

impl WorkflowTestContext {
    pub fn new() -> Result<Self> {
        init_tracing();

        let endpoints = ServiceEndpoints::from_env();
        let billing = BillingClient::new(BillingClientConfig {
            endpoint: endpoints.billing_grpc.clone(),
            ..Default::default()
        })
        .map_err(|e| anyhow!("Invalid billing endpoint: {}", e))?;

        Ok(Self {
            endpoints,
            http: reqwest::Client::new(),
            billing,
            token: None,
        })
    }

    /// `POST /auth/login` through the gateway. Returns the status and, on success, the token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(u16, Option<String>)> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.endpoints.gateway))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok((status, None));
        }
        let body: Value = response.json().await?;
        Ok((status, body["token"].as_str().map(str::to_string)))
    }

    /// Log in with the seeded account and keep the token for later calls.
    pub async fn authenticate(&mut self) -> Result<()> {
        let (email, password) = seeded_credentials();
        match self.login(&email, &password).await? {
            (_, Some(token)) => {
                self.token = Some(token);
                Ok(())
            }
            (status, None) => Err(anyhow!("Login failed with status {}", status)),
        }
    }

    /// Call `/api/{path}` on the gateway with the stored token.
    pub async fn api(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(u16, Value)> {
        let mut request = self
            .http
            .request(method, format!("{}/api/{}", self.endpoints.gateway, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok((status, json))
    }

    pub async fn billing_account(&self, patient_id: &str) -> Result<BillingResponse> {
        self.billing
            .get_billing_account(patient_id)
            .await
            .map_err(|status| anyhow!("GetBillingAccount failed: {}", status))
    }

    /// `GET /analytics/summary` straight from analytics-service.
    pub async fn analytics_summary(&self) -> Result<Value> {
        Ok(self
            .http
            .get(format!("{}/analytics/summary", self.endpoints.analytics))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

/// A patient payload with a unique email.
pub fn unique_patient() -> Value {
    serde_json::json!({
        "name": "Workflow Patient",
        "email": format!("workflow-{}@example.com", uuid::Uuid::new_v4()),
        "address": "1 Integration Way",
        "dateOfBirth": "1985-06-30",
        "registeredDate": "2025-02-01"
    })
}

/// Poll every health endpoint until all answer 200 or `timeout` passes.
pub async fn wait_for_services(timeout: Duration) -> Result<()> {
    let endpoints = ServiceEndpoints::from_env();
    let health_urls = endpoints.health_urls();
    let client = reqwest::Client::new();
    let start = std::time::Instant::now();

    tracing::info!("Waiting for {} services to be healthy...", health_urls.len());

    loop {
        let mut unhealthy_services = Vec::new();

        for (name, url) in &health_urls {
            match client.get(url).timeout(Duration::from_secs(2)).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    unhealthy_services.push(format!("{} (status: {})", name, resp.status()));
                }
                Err(e) => {
                    unhealthy_services.push(format!("{} (error: {})", name, e));
                }
            }
        }

        if unhealthy_services.is_empty() {
            tracing::info!("All services are healthy");
            return Ok(());
        }

        if start.elapsed() > timeout {
            return Err(anyhow!(
                "Timeout waiting for services. Unhealthy: {}",
                unhealthy_services.join(", ")
            ));
        }

        tracing::debug!("Waiting for services: {}", unhealthy_services.join(", "));
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_endpoints_from_env_uses_defaults() {
        let endpoints = ServiceEndpoints::from_env();
        assert!(endpoints.gateway.ends_with(":4004"));
        assert!(endpoints.billing_grpc.ends_with(":9001"));
        assert_eq!(endpoints.health_urls().len(), 5);
    }

    #[test]
    fn unique_patient_emails_differ() {
        assert_ne!(unique_patient()["email"], unique_patient()["email"]);
    }
}

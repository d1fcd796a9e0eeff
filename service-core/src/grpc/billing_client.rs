//! Billing service gRPC client for service-to-service communication.

use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::Request;

use super::interceptors::inject_trace_context;
use super::proto::billing::billing_service_client::BillingServiceClient;
use super::proto::billing::{BillingRequest, BillingResponse, GetBillingAccountRequest};
use super::retry::{retry_grpc_call, RetryConfig};

/// Configuration for the billing service client.
#[derive(Clone, Debug)]
pub struct BillingClientConfig {
    /// The gRPC endpoint of the billing service (e.g., "http://billing-service:9001").
    pub endpoint: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Retry behaviour for transient failures.
    pub retry: RetryConfig,
}

impl Default for BillingClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9001".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

impl BillingClientConfig {
    /// Build the endpoint from a host and port pair, plaintext.
    pub fn from_address(host: &str, port: u16) -> Self {
        Self {
            endpoint: format!("http://{}:{}", host, port),
            ..Default::default()
        }
    }
}

/// Billing service client for calling billing-service via gRPC.
#[derive(Clone)]
pub struct BillingClient {
    client: BillingServiceClient<Channel>,
    retry: RetryConfig,
}

impl BillingClient {
    /// Create a client whose channel connects on first use, so callers can
    /// start before billing-service is reachable.
    pub fn new(config: BillingClientConfig) -> Result<Self, tonic::transport::Error> {
        tracing::info!(endpoint = %config.endpoint, "Configuring gRPC billing client");

        let channel = Endpoint::from_shared(config.endpoint)?
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .connect_lazy();

        Ok(Self {
            client: BillingServiceClient::new(channel),
            retry: config.retry,
        })
    }

    /// Open (or fetch the existing) billing account for a patient.
    pub async fn create_billing_account(
        &self,
        patient_id: &str,
        name: &str,
        email: &str,
    ) -> Result<BillingResponse, tonic::Status> {
        let message = BillingRequest {
            patient_id: patient_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        };

        let response = retry_grpc_call(&self.retry, "create_billing_account", || {
            let mut client = self.client.clone();
            let mut request = Request::new(message.clone());
            inject_trace_context(&mut request);
            async move { client.create_billing_account(request).await }
        })
        .await?
        .into_inner();

        tracing::info!(
            patient_id = %patient_id,
            account_id = %response.account_id,
            status = %response.status,
            "Received gRPC billing response"
        );

        Ok(response)
    }

    /// Look up the billing account that belongs to a patient.
    pub async fn get_billing_account(
        &self,
        patient_id: &str,
    ) -> Result<BillingResponse, tonic::Status> {
        let message = GetBillingAccountRequest {
            patient_id: patient_id.to_string(),
        };

        let response = retry_grpc_call(&self.retry, "get_billing_account", || {
            let mut client = self.client.clone();
            let mut request = Request::new(message.clone());
            inject_trace_context(&mut request);
            async move { client.get_billing_account(request).await }
        })
        .await?;

        Ok(response.into_inner())
    }
}

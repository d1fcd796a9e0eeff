//! Billing account provisioning over gRPC.

use async_trait::async_trait;
use service_core::grpc::proto::billing::BillingResponse;
use service_core::grpc::BillingClient;
use tonic::Status;
use uuid::Uuid;

/// Opens billing accounts for newly registered patients.
#[async_trait]
pub trait BillingAccounts: Send + Sync {
    async fn create_account(
        &self,
        patient_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<BillingResponse, Status>;
}

#[async_trait]
impl BillingAccounts for BillingClient {
    async fn create_account(
        &self,
        patient_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<BillingResponse, Status> {
        self.create_billing_account(&patient_id.to_string(), name, email)
            .await
    }
}

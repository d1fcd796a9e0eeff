//! BillingService gRPC implementation.

use crate::grpc::proto::billing_service_server::BillingService;
use crate::grpc::proto::{BillingRequest, BillingResponse, GetBillingAccountRequest};
use crate::models::{BillingAccount, OpenAccount};
use crate::services::{
    record_account_operation, record_error, record_grpc_request, record_grpc_request_duration,
    Database,
};
use prost_types::Timestamp;
use service_core::grpc::IntoStatus;
use std::sync::Arc;
use std::time::Instant;
use tonic::{Code, Request, Response, Status};
use uuid::Uuid;

const CREATE_METHOD: &str = "CreateBillingAccount";
const GET_METHOD: &str = "GetBillingAccount";

/// BillingService implementation.
pub struct BillingServiceImpl {
    db: Arc<Database>,
}

impl BillingServiceImpl {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[allow(clippy::result_large_err)]
fn parse_patient_id(s: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(s).map_err(|_| Status::invalid_argument(format!("Invalid patientId: {}", s)))
}

#[allow(clippy::result_large_err)]
fn validate_request(req: &BillingRequest) -> Result<OpenAccount, Status> {
    let patient_id = parse_patient_id(&req.patient_id)?;

    if req.name.trim().is_empty() {
        return Err(Status::invalid_argument("name is required"));
    }
    if req.email.trim().is_empty() {
        return Err(Status::invalid_argument("email is required"));
    }

    Ok(OpenAccount {
        patient_id,
        name: req.name.clone(),
        email: req.email.clone(),
    })
}

fn datetime_to_timestamp(dt: chrono::DateTime<chrono::Utc>) -> Option<Timestamp> {
    Some(Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    })
}

#[allow(clippy::result_large_err)]
fn account_to_proto(account: BillingAccount) -> Result<BillingResponse, Status> {
    let status = account.status().map_err(IntoStatus::into_status)?;
    Ok(BillingResponse {
        account_id: account.account_id.to_string(),
        status: status.as_str().to_string(),
        created_at: datetime_to_timestamp(account.created_utc),
    })
}

fn outcome_label(result: &Result<BillingResponse, Status>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(status) => match status.code() {
            Code::InvalidArgument => "invalid_argument",
            Code::NotFound => "not_found",
            _ => "error",
        },
    }
}

/// Count the call and observe its latency, whatever the outcome.
fn record_call(method: &str, start: Instant, result: &Result<BillingResponse, Status>) {
    record_grpc_request(method, outcome_label(result));
    record_grpc_request_duration(method, start.elapsed().as_secs_f64());
}

impl BillingServiceImpl {
    async fn open_account(&self, req: BillingRequest) -> Result<BillingResponse, Status> {
        let input = validate_request(&req)?;

        let account = self.db.open_account(&input).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to open billing account");
            record_error("database", CREATE_METHOD);
            e.into_status()
        })?;

        record_account_operation("open", "ok");
        let response = account_to_proto(account)?;
        tracing::info!(
            patient_id = %req.patient_id,
            account_id = %response.account_id,
            status = %response.status,
            "Billing account ready"
        );
        Ok(response)
    }

    async fn find_account(&self, req: GetBillingAccountRequest) -> Result<BillingResponse, Status> {
        let patient_id = parse_patient_id(&req.patient_id)?;

        let account = self
            .db
            .get_account_by_patient(patient_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to get billing account");
                record_error("database", GET_METHOD);
                e.into_status()
            })?
            .ok_or_else(|| {
                record_account_operation("lookup", "not_found");
                Status::not_found(format!("No billing account for patient {}", patient_id))
            })?;

        record_account_operation("lookup", "ok");
        account_to_proto(account)
    }
}

#[tonic::async_trait]
impl BillingService for BillingServiceImpl {
    async fn create_billing_account(
        &self,
        request: Request<BillingRequest>,
    ) -> Result<Response<BillingResponse>, Status> {
        let start = Instant::now();
        let req = request.into_inner();
        tracing::info!(
            patient_id = %req.patient_id,
            name = %req.name,
            email = %req.email,
            "createBillingAccount request received"
        );

        let result = self.open_account(req).await;
        record_call(CREATE_METHOD, start, &result);
        result.map(Response::new)
    }

    async fn get_billing_account(
        &self,
        request: Request<GetBillingAccountRequest>,
    ) -> Result<Response<BillingResponse>, Status> {
        let start = Instant::now();
        let result = self.find_account(request.into_inner()).await;
        record_call(GET_METHOD, start, &result);
        result.map(Response::new)
    }
}

mod common;

use billing_service::grpc::proto::{BillingRequest, GetBillingAccountRequest};
use common::TestApp;
use tonic::Code;
use uuid::Uuid;

fn billing_request(patient_id: &str) -> BillingRequest {
    BillingRequest {
        patient_id: patient_id.to_string(),
        name: "Jane Doe".to_string(),
        email: "jane.doe@example.com".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn create_billing_account_returns_active_account() {
    let app = TestApp::spawn().await;
    let mut client = app.grpc_client().await;

    let response = client
        .create_billing_account(billing_request(&Uuid::new_v4().to_string()))
        .await
        .expect("CreateBillingAccount failed")
        .into_inner();

    assert!(Uuid::parse_str(&response.account_id).is_ok());
    assert_eq!(response.status, "ACTIVE");
    assert!(response.created_at.is_some());

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn create_billing_account_is_idempotent_per_patient() {
    let app = TestApp::spawn().await;
    let mut client = app.grpc_client().await;
    let patient_id = Uuid::new_v4().to_string();

    let first = client
        .create_billing_account(billing_request(&patient_id))
        .await
        .unwrap()
        .into_inner();
    let second = client
        .create_billing_account(billing_request(&patient_id))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(first.account_id, second.account_id);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn create_billing_account_rejects_malformed_patient_id() {
    let app = TestApp::spawn().await;
    let mut client = app.grpc_client().await;

    let status = client
        .create_billing_account(billing_request("not-a-uuid"))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn get_billing_account_finds_opened_account() {
    let app = TestApp::spawn().await;
    let mut client = app.grpc_client().await;
    let patient_id = Uuid::new_v4().to_string();

    let created = client
        .create_billing_account(billing_request(&patient_id))
        .await
        .unwrap()
        .into_inner();

    let fetched = client
        .get_billing_account(GetBillingAccountRequest {
            patient_id: patient_id.clone(),
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(created.account_id, fetched.account_id);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn get_billing_account_for_unknown_patient_is_not_found() {
    let app = TestApp::spawn().await;
    let mut client = app.grpc_client().await;

    let status = client
        .get_billing_account(GetBillingAccountRequest {
            patient_id: Uuid::new_v4().to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::NotFound);

    app.cleanup().await;
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use service_core::extract::ValidatedJson;
use uuid::Uuid;

use crate::{
    dtos::patient::{PatientRequest, PatientResponse},
    AppState,
};

fn parse_patient_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid patient id: {}", raw)))
}

/// List all patients
#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All registered patients", body = [PatientResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Patient"
)]
pub async fn list_patients(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let patients: Vec<PatientResponse> = state
        .patients
        .list()
        .await?
        .into_iter()
        .map(PatientResponse::from)
        .collect();
    Ok(Json(patients))
}

/// Register a new patient
#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Patient registered", body = PatientResponse),
        (status = 400, description = "Malformed body or date", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 502, description = "Billing service failure", body = ErrorResponse)
    ),
    tag = "Patient"
)]
pub async fn create_patient(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PatientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patient = state.patients.create(req.into_new_patient()?).await?;
    Ok((StatusCode::OK, Json(PatientResponse::from(patient))))
}

/// Update a patient
#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id (UUID)")),
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = PatientResponse),
        (status = 400, description = "Malformed id, body or date", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 409, description = "Email owned by another patient", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Patient"
)]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PatientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_patient_id(&id)?;
    let patient = state.patients.update(id, req.into_changes()?).await?;
    Ok(Json(PatientResponse::from(patient)))
}

/// Delete a patient
#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id (UUID)")),
    responses(
        (status = 204, description = "Patient deleted (or never existed)"),
        (status = 400, description = "Malformed id", body = ErrorResponse)
    ),
    tag = "Patient"
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_patient_id(&id)?;
    state.patients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

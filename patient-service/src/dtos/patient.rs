use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{NewPatient, Patient, PatientChanges};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Jane Doe", max_length = 100)]
    pub name: String,

    #[validate(email(message = "Email should be valid"))]
    #[schema(example = "jane.doe@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Address is required"))]
    #[schema(example = "12 Harbour Road, Bristol")]
    pub address: String,

    #[validate(length(min = 1, message = "Date of birth is required"))]
    #[schema(example = "1990-04-12")]
    pub date_of_birth: String,

    /// Required when registering; ignored on update.
    #[serde(default)]
    #[schema(example = "2025-01-15")]
    pub registered_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    #[schema(example = "123e4567-e89b-12d3-a456-426614174000")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    #[schema(example = "1990-04-12")]
    pub date_of_birth: String,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id.to_string(),
            name: patient.name,
            email: patient.email,
            address: patient.address,
            date_of_birth: patient.date_of_birth.format(DATE_FORMAT).to_string(),
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        AppError::BadRequest(anyhow::anyhow!(
            "Invalid {}: '{}' (expected YYYY-MM-DD)",
            field,
            value
        ))
    })
}

impl PatientRequest {
    /// Convert a validated request into a registration.
    pub fn into_new_patient(self) -> Result<NewPatient, AppError> {
        let registered_date = match self.registered_date.as_deref() {
            Some(value) if !value.trim().is_empty() => parse_date("registeredDate", value)?,
            _ => {
                let mut errors = ValidationErrors::new();
                let mut error = ValidationError::new("required");
                error.message = Some("Registered date is required".into());
                errors.add("registeredDate", error);
                return Err(AppError::ValidationError(errors));
            }
        };

        Ok(NewPatient {
            date_of_birth: parse_date("dateOfBirth", &self.date_of_birth)?,
            registered_date,
            name: self.name,
            email: self.email,
            address: self.address,
        })
    }

    /// Convert a validated request into an update. `registeredDate` is not read.
    pub fn into_changes(self) -> Result<PatientChanges, AppError> {
        Ok(PatientChanges {
            date_of_birth: parse_date("dateOfBirth", &self.date_of_birth)?,
            name: self.name,
            email: self.email,
            address: self.address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PatientRequest {
        PatientRequest {
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            address: "12 Harbour Road".to_string(),
            date_of_birth: "1990-04-12".to_string(),
            registered_date: Some("2025-01-15".to_string()),
        }
    }

    #[test]
    fn test_request_uses_camel_case_fields() {
        let json = serde_json::json!({
            "name": "Jane Doe",
            "email": "jane.doe@example.com",
            "address": "12 Harbour Road",
            "dateOfBirth": "1990-04-12",
            "registeredDate": "2025-01-15"
        });
        let req: PatientRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.date_of_birth, "1990-04-12");
        assert_eq!(req.registered_date.as_deref(), Some("2025-01-15"));
    }

    #[test]
    fn test_validation_rejects_long_name_and_bad_email() {
        let mut req = request();
        req.name = "x".repeat(101);
        req.email = "not-an-email".to_string();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_registration_requires_registered_date() {
        let mut req = request();
        req.registered_date = None;

        let err = req.into_new_patient().unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_malformed_date_is_bad_request() {
        let mut req = request();
        req.date_of_birth = "12/04/1990".to_string();

        let err = req.into_changes().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_update_ignores_registered_date() {
        let mut req = request();
        req.registered_date = Some("garbage".to_string());

        let changes = req.into_changes().unwrap();
        assert_eq!(
            changes.date_of_birth,
            NaiveDate::from_ymd_opt(1990, 4, 12).unwrap()
        );
    }

    #[test]
    fn test_response_formats_iso_dates() {
        let patient = Patient::register(request().into_new_patient().unwrap());
        let response = PatientResponse::from(patient.clone());
        assert_eq!(response.id, patient.id.to_string());
        assert_eq!(response.date_of_birth, "1990-04-12");
    }
}

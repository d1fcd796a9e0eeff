//! Patient registration workflow.

use service_core::error::AppError;
use service_core::events::PatientEvent;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::models::{NewPatient, Patient, PatientChanges};
use crate::services::metrics::record_patient_operation;
use crate::services::{BillingAccounts, EventPublisher, PatientStore};

/// Coordinates the store, billing-service and the event stream.
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn PatientStore>,
    billing: Arc<dyn BillingAccounts>,
    events: Arc<dyn EventPublisher>,
}

fn email_conflict(email: &str) -> AppError {
    AppError::Conflict(anyhow::anyhow!(
        "A patient with this email already exists: {}",
        email
    ))
}

impl PatientService {
    pub fn new(
        store: Arc<dyn PatientStore>,
        billing: Arc<dyn BillingAccounts>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            billing,
            events,
        }
    }

    pub fn store(&self) -> &Arc<dyn PatientStore> {
        &self.store
    }

    pub async fn list(&self) -> Result<Vec<Patient>, AppError> {
        self.store.list().await
    }

    /// Register a patient, open their billing account and announce the registration.
    ///
    /// A billing failure rolls the registration back. A failed publish does not.
    #[instrument(skip(self, new), fields(email = %new.email))]
    pub async fn create(&self, new: NewPatient) -> Result<Patient, AppError> {
        if self.store.email_taken(&new.email, None).await? {
            record_patient_operation("create", "conflict");
            return Err(email_conflict(&new.email));
        }

        let patient = Patient::register(new);
        self.store.insert(&patient).await?;
        info!(patient_id = %patient.id, "Patient saved");

        match self
            .billing
            .create_account(patient.id, &patient.name, &patient.email)
            .await
        {
            Ok(account) => {
                info!(
                    patient_id = %patient.id,
                    account_id = %account.account_id,
                    status = %account.status,
                    "Received gRPC response from billing service"
                );
            }
            Err(status) => {
                error!(
                    patient_id = %patient.id,
                    code = ?status.code(),
                    message = status.message(),
                    "Billing account creation failed, removing patient"
                );
                if let Err(e) = self.store.delete(patient.id).await {
                    error!(patient_id = %patient.id, error = %e, "Failed to remove patient after billing failure");
                }
                record_patient_operation("create", "billing_failed");
                return Err(AppError::BadGateway(format!(
                    "Billing service could not open an account: {}",
                    status.message()
                )));
            }
        }

        let event = PatientEvent::created(patient.id.to_string(), &patient.name, &patient.email);
        if let Err(e) = self.events.publish(&event).await {
            error!(patient_id = %patient.id, error = %e, "Error sending PatientCreated event");
        }

        record_patient_operation("create", "ok");
        Ok(patient)
    }

    #[instrument(skip(self, changes), fields(patient_id = %id))]
    pub async fn update(&self, id: Uuid, changes: PatientChanges) -> Result<Patient, AppError> {
        let mut patient = self.store.find_by_id(id).await?.ok_or_else(|| {
            record_patient_operation("update", "not_found");
            AppError::NotFound(anyhow::anyhow!("Patient not found with ID: {}", id))
        })?;

        if self.store.email_taken(&changes.email, Some(id)).await? {
            record_patient_operation("update", "conflict");
            return Err(email_conflict(&changes.email));
        }

        patient.apply(changes);
        self.store.update(&patient).await?;

        record_patient_operation("update", "ok");
        Ok(patient)
    }

    /// Delete a patient. Unknown ids are not an error.
    #[instrument(skip(self), fields(patient_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self.store.delete(id).await?;
        record_patient_operation("delete", if removed { "ok" } else { "absent" });
        Ok(())
    }
}

//! Patient persistence.

use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::Patient;
use crate::services::metrics::DB_QUERY_DURATION;

/// Storage for patient records.
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Patient>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, AppError>;

    /// Whether `email` is in use, optionally ignoring one patient.
    async fn email_taken(&self, email: &str, excluding: Option<Uuid>) -> Result<bool, AppError>;

    async fn insert(&self, patient: &Patient) -> Result<(), AppError>;

    async fn update(&self, patient: &Patient) -> Result<(), AppError>;

    /// Remove a patient. Returns whether a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// PostgreSQL-backed [`PatientStore`].
#[derive(Clone)]
pub struct PgPatientStore {
    pool: PgPool,
}

const PATIENT_COLUMNS: &str =
    "id, name, email, address, date_of_birth, registered_date, created_utc, updated_utc";

impl PgPatientStore {
    #[instrument(skip(database_url), fields(service = "patient-service"))]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl PatientStore for PgPatientStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Patient>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_patients"])
            .start_timer();

        let patients = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {} FROM patients ORDER BY created_utc, id",
            PATIENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(patients)
    }

    #[instrument(skip(self), fields(patient_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_patient"])
            .start_timer();

        let patient = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {} FROM patients WHERE id = $1",
            PATIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(patient)
    }

    #[instrument(skip(self, email))]
    async fn email_taken(&self, email: &str, excluding: Option<Uuid>) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["email_taken"])
            .start_timer();

        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM patients
                WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(taken)
    }

    #[instrument(skip(self, patient), fields(patient_id = %patient.id))]
    async fn insert(&self, patient: &Patient) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_patient"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO patients (id, name, email, address, date_of_birth, registered_date, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(patient.id)
        .bind(&patient.name)
        .bind(&patient.email)
        .bind(&patient.address)
        .bind(patient.date_of_birth)
        .bind(patient.registered_date)
        .bind(patient.created_utc)
        .bind(patient.updated_utc)
        .execute(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self, patient), fields(patient_id = %patient.id))]
    async fn update(&self, patient: &Patient) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_patient"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE patients
            SET name = $2, email = $3, address = $4, date_of_birth = $5, updated_utc = $6
            WHERE id = $1
            "#,
        )
        .bind(patient.id)
        .bind(&patient.name)
        .bind(&patient.email)
        .bind(&patient.address)
        .bind(patient.date_of_birth)
        .bind(patient.updated_utc)
        .execute(&self.pool)
        .await?;

        timer.observe_duration();

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Patient not found with ID: {}",
                patient.id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(patient_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_patient"])
            .start_timer();

        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}

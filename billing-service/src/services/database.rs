//! Database service for billing-service.

use crate::models::{AccountStatus, BillingAccount, OpenAccount};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "billing-service"))]
    pub async fn new(
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

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    /// Run database migrations.
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

    /// Open an account for a patient, or return the one already on file.
    ///
    /// Patient-service may retry `CreateBillingAccount` after a timeout, so a
    /// second call for the same patient must not create a second account. The
    /// stored name and email are left as first recorded.
    #[instrument(skip(self, input), fields(patient_id = %input.patient_id))]
    pub async fn open_account(&self, input: &OpenAccount) -> Result<BillingAccount, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["open_account"])
            .start_timer();

        let inserted = sqlx::query_as::<_, BillingAccount>(
            r#"
            INSERT INTO billing_accounts (account_id, patient_id, name, email, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (patient_id) DO NOTHING
            RETURNING account_id, patient_id, name, email, status, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.patient_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(AccountStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to open account: {}", e)))?;

        let account = match inserted {
            Some(account) => {
                info!(account_id = %account.account_id, "Billing account opened");
                account
            }
            None => {
                let existing = self
                    .get_account_by_patient(input.patient_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::DatabaseError(anyhow::anyhow!(
                            "Billing account for patient {} vanished after conflict",
                            input.patient_id
                        ))
                    })?;
                info!(account_id = %existing.account_id, "Billing account already exists");
                existing
            }
        };

        timer.observe_duration();

        Ok(account)
    }

    /// Get the account that belongs to a patient.
    #[instrument(skip(self), fields(patient_id = %patient_id))]
    pub async fn get_account_by_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Option<BillingAccount>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_account_by_patient"])
            .start_timer();

        let account = sqlx::query_as::<_, BillingAccount>(
            r#"
            SELECT account_id, patient_id, name, email, status, created_utc
            FROM billing_accounts
            WHERE patient_id = $1
            "#,
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get account: {}", e)))?;

        timer.observe_duration();

        Ok(account)
    }
}

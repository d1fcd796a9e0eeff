use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

use crate::models::User;
use crate::services::metrics::DB_QUERY_DURATION;

/// User account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Insert unless the email is already registered. Returns whether a row was added.
    async fn insert_if_absent(&self, user: &User) -> Result<bool, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[instrument(skip(database_url), fields(service = "auth-service"))]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_user_by_email"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role, created_utc FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert_if_absent(&self, user: &User) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_user"])
            .start_timer();

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_utc)
        .execute(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

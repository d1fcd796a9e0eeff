use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_utc: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, role: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            created_utc: Utc::now(),
        }
    }
}

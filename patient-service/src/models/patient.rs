//! Patient record as stored in PostgreSQL.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Fields needed to register a patient.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

/// Fields an update may change. `registered_date` is fixed at registration.
#[derive(Debug, Clone)]
pub struct PatientChanges {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
}

impl Patient {
    /// Build the record a fresh registration would produce.
    pub fn register(new: NewPatient) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            address: new.address,
            date_of_birth: new.date_of_birth,
            registered_date: new.registered_date,
            created_utc: now,
            updated_utc: now,
        }
    }

    pub fn apply(&mut self, changes: PatientChanges) {
        self.name = changes.name;
        self.email = changes.email;
        self.address = changes.address;
        self.date_of_birth = changes.date_of_birth;
        self.updated_utc = Utc::now();
    }
}

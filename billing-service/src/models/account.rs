//! Billing account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle state of a billing account. Accounts open as `ACTIVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AccountStatus::Active),
            other => Err(AppError::InternalError(anyhow::anyhow!(
                "Unknown billing account status: {}",
                other
            ))),
        }
    }
}

/// A billing account row. One per patient.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BillingAccount {
    pub account_id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: String,
    pub created_utc: DateTime<Utc>,
}

impl BillingAccount {
    pub fn status(&self) -> Result<AccountStatus, AppError> {
        self.status.parse()
    }
}

/// Input for opening an account.
#[derive(Debug, Clone)]
pub struct OpenAccount {
    pub patient_id: Uuid,
    pub name: String,
    pub email: String,
}

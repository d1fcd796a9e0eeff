//! Data models for billing-service.

pub mod account;

pub use account::{AccountStatus, BillingAccount, OpenAccount};

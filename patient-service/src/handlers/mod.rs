//! HTTP handlers for patient-service.

pub mod health;
pub mod patient;

pub use health::*;
pub use patient::*;

//! Services module for patient-service.

pub mod billing;
pub mod events;
pub mod metrics;
pub mod patient;
pub mod store;

pub use billing::BillingAccounts;
pub use events::{EventPublisher, KafkaEventPublisher};
pub use metrics::{get_metrics, init_metrics, record_patient_operation};
pub use patient::PatientService;
pub use store::{PatientStore, PgPatientStore};

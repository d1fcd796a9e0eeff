pub mod patient;

pub use patient::{NewPatient, Patient, PatientChanges};

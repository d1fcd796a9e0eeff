//! Patient lifecycle events exchanged over Kafka.
//!
//! Events are protobuf-encoded `patient.events.PatientEvent` messages carried
//! as raw bytes on the `patient` topic.

use prost::Message;

/// Generated protobuf code.
pub mod proto {
    tonic::include_proto!("patient.events");
}

pub use proto::PatientEvent;

/// Default topic patient events are published to.
pub const PATIENT_TOPIC: &str = "patient";

/// Event type emitted when a patient registers.
pub const PATIENT_CREATED: &str = "PATIENT_CREATED";

impl PatientEvent {
    /// Build a `PATIENT_CREATED` event.
    pub fn created(patient_id: impl Into<String>, name: &str, email: &str) -> Self {
        Self {
            patient_id: patient_id.into(),
            name: name.to_string(),
            email: email.to_string(),
            event_type: PATIENT_CREATED.to_string(),
        }
    }

    /// Serialize to the wire format used on the topic.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Parse a payload received from the topic.
    pub fn from_bytes(payload: &[u8]) -> Result<Self, prost::DecodeError> {
        Self::decode(payload)
    }
}

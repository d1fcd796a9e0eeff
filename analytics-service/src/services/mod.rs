pub mod consumer;
pub mod metrics;
pub mod tally;

pub use consumer::{process_payload, PatientEventConsumer};
pub use metrics::{get_metrics, init_metrics};
pub use tally::{EventTally, TallySummary};

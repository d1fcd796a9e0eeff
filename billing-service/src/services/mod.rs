//! Services module for billing-service.

pub mod database;
pub mod metrics;

pub use database::Database;
pub use metrics::{
    get_metrics, init_metrics, record_account_operation, record_error, record_grpc_request,
    record_grpc_request_duration,
};

//! gRPC utilities for the patient management services.
//!
//! This module provides shared gRPC infrastructure including:
//! - Error conversion between `AppError` and `tonic::Status`
//! - Interceptors for trace context propagation
//! - Server builder utilities
//! - Retry utilities for service-to-service calls
//! - Billing service client used by patient-service

pub mod billing_client;
pub mod error;
pub mod interceptors;
pub mod retry;
pub mod server;

// Include the generated proto code for clients
pub mod proto {
    pub mod billing {
        tonic::include_proto!("billing");
    }
}

pub use billing_client::{BillingClient, BillingClientConfig};
pub use error::IntoStatus;
pub use interceptors::{
    extract_request_id, extract_traceparent, inject_trace_context, trace_context_interceptor,
};
pub use retry::{is_permanent_failure, is_retryable, retry_grpc_call, RetryConfig};
pub use server::{create_reflection_service, GrpcServerBuilder};

// Re-export commonly used tonic types
pub use tonic::{Code, Request, Response, Status};

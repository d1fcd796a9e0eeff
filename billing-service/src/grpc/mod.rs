//! gRPC module for billing-service.

mod service;

pub use service::BillingServiceImpl;
pub use service_core::grpc::trace_context_interceptor;

/// Generated protobuf code.
pub mod proto {
    tonic::include_proto!("billing");

    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("billing_descriptor");
}

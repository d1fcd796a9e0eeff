//! HTTP handlers for billing-service. Billing itself is served over gRPC.

pub mod health;

pub use health::*;

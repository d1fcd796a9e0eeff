//! HTTP handlers for auth-service.

pub mod auth;
pub mod health;

pub use auth::*;
pub use health::*;

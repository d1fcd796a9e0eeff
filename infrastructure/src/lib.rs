//! CloudFormation synthesis for the LocalStack deployment.

pub mod config;
pub mod constructs;
pub mod error;
pub mod stack;
pub mod template;

pub use config::StackConfig;
pub use error::StackError;
pub use stack::synthesize;
pub use template::Template;

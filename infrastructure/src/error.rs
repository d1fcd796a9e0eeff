use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Resource {0} is defined twice")]
    DuplicateResource(String),

    #[error("Resource {from} depends on unknown resource {on}")]
    UnknownDependency { from: String, on: String },

    #[error("Resource {from} references unknown resource {target}")]
    DanglingReference { from: String, target: String },

    #[error("Resource {0} cannot depend on itself")]
    SelfDependency(String),

    #[error("Kafka broker count {brokers} must be a positive multiple of the availability zone count {azs}")]
    BrokerCountNotMultipleOfAzs { brokers: u32, azs: u32 },

    #[error("Availability zone count must be between 1 and 6, got {0}")]
    InvalidAzCount(u32),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

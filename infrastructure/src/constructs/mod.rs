//! Groups of resources that are always emitted together.

pub mod database;
pub mod ecs;
pub mod kafka;
pub mod network;

pub use database::{Database, DatabaseProps};
pub use ecs::{Cluster, FargateService, FargateServiceProps, LoadBalancedService};
pub use kafka::{MskCluster, MskClusterProps};
pub use network::Vpc;

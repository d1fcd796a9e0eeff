pub mod metrics;
pub mod proxy;
pub mod validator;

pub use metrics::{get_metrics, init_metrics};
pub use proxy::{is_hop_by_hop, rewrite_path, Forwarder};
pub use validator::TokenValidator;

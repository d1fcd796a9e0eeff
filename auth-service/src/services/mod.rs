pub mod auth;
pub mod jwt;
pub mod metrics;
pub mod store;

pub use auth::AuthService;
pub use jwt::{Claims, JwtService};
pub use metrics::{get_metrics, init_metrics};
pub use store::{PgUserStore, UserStore};

pub mod jwt;

pub use jwt::jwt_filter;

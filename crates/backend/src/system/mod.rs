pub mod auth;
pub mod tracing;
pub mod users;

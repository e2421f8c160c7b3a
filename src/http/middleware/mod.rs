//! Stock middleware for route chains.
//!
//! Each type implements `routing::Middleware` and is meant to be appended to
//! a `Chain` at registration time.

pub mod access_log;
pub mod auth;
pub mod request_id;

pub use access_log::AccessLog;
pub use auth::BearerAuth;
pub use request_id::RequestId;

//! HTTP adapter subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, trace/timeout/request-id layers)
//!     → body buffered → request.rs (Request<Bytes>)
//!     → routing::Router::serve (match, middleware chain, handler)
//!     → response.rs (ResponseWriter → axum Response)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - The router never touches sockets; this module is the only async code
//!   between the listener and the synchronous dispatch
//! - Static files and stock middlewares live here because they speak HTTP,
//!   not routing

pub mod files;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use files::{FileServer, FsFileServer};
pub use request::{Request, RequestIdExt, X_REQUEST_ID};
pub use response::ResponseWriter;
pub use server::HttpServer;

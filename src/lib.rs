//! Pathmux: a segment-trie URL router with middleware chains.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum, trace/timeout/limit/request-id)
//!                         │ body buffered, spawn_blocking
//!                         ▼
//!                     routing::Router ── per-method Segment trie
//!                         │ two-pass search, backtracking
//!                         ▼
//!                     routing::Chain (middleware → handler)
//!                         │
//!     Client Response     ▼
//!     ◀────────────── http::ResponseWriter
//! ```
//!
//! The routing engine is synchronous and transport-agnostic; everything
//! async lives in `http` and `lifecycle`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{HttpServer, Request, ResponseWriter};
pub use lifecycle::Shutdown;
pub use routing::{
    handler_fn, middleware_fn, Chain, Context, Handler, Middleware, Next, RouteError, Router,
};

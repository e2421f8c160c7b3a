//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / http / lifecycle
//!     → tracing events (structured fields)
//!     → logging.rs subscriber (env filter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Structured logging through the tracing crate
//! - Request ID flows into every access-log line
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_logging;

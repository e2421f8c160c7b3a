//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before serving):
//!     router.handle(method, path, handler | chain)
//!     → split path on '/', classify each token (segment.rs)
//!     → walk/extend the method's trie, install the chain on the last node
//!
//! Incoming Request (method, path):
//!     → router.rs (pick the method's trie)
//!     → segment.rs (depth-first search, raw > match/regex > wildcard)
//!     → context.rs (captured values → params by name)
//!     → chain.rs (middleware steps → terminal handler)
//!     → no match: not-found handler
//! ```
//!
//! # Design Decisions
//! - Tries are built once and read concurrently without locks
//! - Per-request state (Context, chain cursor) never outlives one dispatch
//! - Deterministic: at most one non-raw child per node, raw always first
//! - Wildcards lose to any other route: they only match on a second pass

pub mod chain;
pub mod context;
pub mod error;
pub mod router;
pub mod segment;

pub use chain::{handler_fn, middleware_fn, Chain, Handler, HandlerFn, Middleware, MiddlewareFn, Next};
pub use context::{Context, MatchedSegment};
pub use error::RouteError;
pub use router::{not_found, panic_message, PanicHandler, RouteMatch, Router};
pub use segment::{Segment, SegmentKind};

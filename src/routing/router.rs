//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Keep one route trie per HTTP method
//! - Register routes, rejecting malformed or conflicting paths
//! - Look up the chain for a request and run it with a fresh Context
//! - Answer unmatched requests through the not-found handler
//! - Optionally recover handler panics through the panic handler
//!
//! # Design Decisions
//! - Registration takes `&mut self`, dispatch `&self`: once the router is
//!   shared through an `Arc` the route table can no longer change
//! - Registration errors are returned, never raised at request time
//! - Without a panic handler, panics propagate to the caller of `serve`

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, StatusCode};

use crate::config::RouterConfig;
use crate::http::files::{FileServer, FsFileServer};
use crate::http::{Request, ResponseWriter};
use crate::routing::chain::{handler_fn, Chain, Handler};
use crate::routing::context::Context;
use crate::routing::error::RouteError;
use crate::routing::segment::{find_route, Lookup, Segment};

/// Called with the payload of a recovered panic.
pub type PanicHandler = Arc<dyn Fn(&mut ResponseWriter, &Request, Box<dyn Any + Send>) + Send + Sync>;

/// Static-file routes must end with this wildcard.
const FILEPATH_SUFFIX: &str = "/*filepath";

/// A successful lookup: the chain to run and the context it runs with.
pub struct RouteMatch<'r> {
    pub chain: &'r Chain,
    pub context: Context,
}

pub struct Router {
    roots: HashMap<Method, Segment>,
    has_wildcard: bool,
    config: RouterConfig,
    not_found: Option<Arc<dyn Handler>>,
    panic_handler: Option<PanicHandler>,
    file_server: Arc<dyn FileServer>,
}

impl Default for Router {
    fn default() -> Self {
        Self::with_config(RouterConfig::default())
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            roots: HashMap::new(),
            has_wildcard: false,
            config,
            not_found: None,
            panic_handler: None,
            file_server: Arc::new(FsFileServer::new()),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Whether any wildcard segment has been registered for any method.
    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    /// Register `handler` for `method` and `path`.
    pub fn handle<H: Handler + 'static>(
        &mut self,
        method: Method,
        path: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        self.handle_chain(method, path, Chain::new().handler(handler))
    }

    /// Register a full chain for `method` and `path`.
    ///
    /// The chain's steps are appended to the node's chain and its terminal
    /// handler becomes the node's handler.
    pub fn handle_chain(&mut self, method: Method, path: &str, chain: Chain) -> Result<(), RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash { path: path.into() });
        }
        if !chain.is_routable() {
            return Err(RouteError::MissingHandler { path: path.into() });
        }

        let root = self.roots.entry(method.clone()).or_insert_with(Segment::root);
        let node = root.insert(path, chain, || RouteError::Redefined {
            method: method.clone(),
            path: path.into(),
        })?;
        let kind = node.kind().as_str();

        if path.split('/').any(|token| token.starts_with('*')) {
            self.has_wildcard = true;
        }
        tracing::debug!(method = %method, path = %path, kind = kind, "Route registered");
        Ok(())
    }

    pub fn get<H: Handler + 'static>(&mut self, path: &str, handler: H) -> Result<(), RouteError> {
        self.handle(Method::GET, path, handler)
    }

    pub fn post<H: Handler + 'static>(&mut self, path: &str, handler: H) -> Result<(), RouteError> {
        self.handle(Method::POST, path, handler)
    }

    pub fn put<H: Handler + 'static>(&mut self, path: &str, handler: H) -> Result<(), RouteError> {
        self.handle(Method::PUT, path, handler)
    }

    pub fn patch<H: Handler + 'static>(&mut self, path: &str, handler: H) -> Result<(), RouteError> {
        self.handle(Method::PATCH, path, handler)
    }

    pub fn delete<H: Handler + 'static>(&mut self, path: &str, handler: H) -> Result<(), RouteError> {
        self.handle(Method::DELETE, path, handler)
    }

    pub fn head<H: Handler + 'static>(&mut self, path: &str, handler: H) -> Result<(), RouteError> {
        self.handle(Method::HEAD, path, handler)
    }

    pub fn options<H: Handler + 'static>(&mut self, path: &str, handler: H) -> Result<(), RouteError> {
        self.handle(Method::OPTIONS, path, handler)
    }

    /// Serve files below `root` on GET `path`, which must end with
    /// `/*filepath`.
    ///
    /// The route records `root` in the context, runs `pre` if given, then
    /// hands the captured file path to the file server configured at the
    /// time of this call.
    pub fn serve_files(
        &mut self,
        path: &str,
        root: impl Into<PathBuf>,
        pre: Option<Arc<dyn Handler>>,
    ) -> Result<(), RouteError> {
        if !path.ends_with(FILEPATH_SUFFIX) {
            return Err(RouteError::InvalidFilesPath { path: path.into() });
        }

        let root = root.into();
        let files = Arc::clone(&self.file_server);
        self.get(
            path,
            handler_fn(move |w, req, ctx| {
                ctx.set_file_root(root.clone());
                if let Some(pre) = &pre {
                    pre.serve(w, req, ctx);
                }
                let filepath = ctx.param("filepath").unwrap_or_default().to_string();
                files.serve_file(w, req, &root, &filepath);
            }),
        )
    }

    pub fn set_not_found<H: Handler + 'static>(&mut self, handler: H) {
        self.not_found = Some(Arc::new(handler));
    }

    pub fn set_panic_handler<F>(&mut self, handler: F)
    where
        F: Fn(&mut ResponseWriter, &Request, Box<dyn Any + Send>) + Send + Sync + 'static,
    {
        self.panic_handler = Some(Arc::new(handler));
    }

    pub fn set_file_server<S: FileServer + 'static>(&mut self, server: S) {
        self.file_server = Arc::new(server);
    }

    /// Find the routable chain for `method` and `path`.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let root = self.roots.get(method)?;
        let lookup = Lookup {
            has_wildcard: self.has_wildcard,
            strict_trailing_slash: self.config.strict_trailing_slash,
            trailing_slash: path.len() > 1 && path.ends_with('/'),
        };

        let trail = find_route(root, path, lookup)?;
        let leaf = trail.last()?.segment;
        let matched = trail
            .into_iter()
            .map(|step| step.segment.to_matched(step.values))
            .collect();

        Some(RouteMatch {
            chain: leaf.chain(),
            context: Context::from_matched(matched),
        })
    }

    /// Registered `(method, pattern)` pairs, sorted.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut routes = Vec::new();
        for (method, root) in &self.roots {
            let mut patterns = Vec::new();
            root.collect_patterns("", &mut patterns);
            routes.extend(patterns.into_iter().map(|p| (method.clone(), p)));
        }
        routes.sort_by(|a, b| (a.0.as_str(), &a.1).cmp(&(b.0.as_str(), &b.1)));
        routes
    }

    /// Dispatch entry point: every outcome is written to `w`.
    pub fn serve(&self, w: &mut ResponseWriter, req: &Request) {
        let Some(on_panic) = &self.panic_handler else {
            self.dispatch(w, req);
            return;
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(w, req)));
        if let Err(payload) = result {
            tracing::error!(
                method = %req.method(),
                path = %req.uri().path(),
                panic = %panic_message(payload.as_ref()),
                "Recovered from handler panic"
            );
            w.reset();
            on_panic(w, req, payload);
        }
    }

    fn dispatch(&self, w: &mut ResponseWriter, req: &Request) {
        let path = req.uri().path();
        if let Some(RouteMatch { chain, mut context }) = self.lookup(req.method(), path) {
            tracing::trace!(method = %req.method(), path = %path, steps = chain.len(), "Route matched");
            chain.serve(w, req, &mut context);
            return;
        }

        tracing::debug!(method = %req.method(), path = %path, "No route matched");
        match &self.not_found {
            Some(handler) => handler.serve(w, req, &mut Context::new()),
            None => not_found(w),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("methods", &self.roots.keys().collect::<Vec<_>>())
            .field("has_wildcard", &self.has_wildcard)
            .field("config", &self.config)
            .field("not_found", &self.not_found.is_some())
            .field("panic_handler", &self.panic_handler.is_some())
            .finish()
    }
}

/// Default not-found response.
pub fn not_found(w: &mut ResponseWriter) {
    w.text(StatusCode::NOT_FOUND, "404 page not found\n");
    w.headers_mut()
        .insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

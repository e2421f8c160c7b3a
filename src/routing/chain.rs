//! Handlers, middleware and the chain that composes them.
//!
//! # Execution
//! ```text
//! chain.serve()
//!     → Next { cursor: 0 }.run()
//!     → steps[0].handle(.., Next { cursor: 1 })
//!         → next.run() → steps[1].handle(.., Next { cursor: 2 })
//!             → ...
//!                 → next.run() → terminal.serve()
//! ```
//!
//! # Design Decisions
//! - The cursor lives in `Next`, a call-local value; a `Chain` holds no
//!   per-request state and is shared read-only by concurrent dispatches
//! - `Next::run` consumes the continuation, so a step resumes the chain at
//!   most once and never re-runs earlier steps
//! - A step that drops `next` without running it short-circuits the chain

use std::fmt;
use std::sync::Arc;

use crate::http::{Request, ResponseWriter};
use crate::routing::context::Context;

/// Serves a request by writing to the response sink.
pub trait Handler: Send + Sync {
    fn serve(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context);
}

/// A processing step that runs before and/or after the rest of the chain.
///
/// The step decides whether the chain continues by running `next`.
pub trait Middleware: Send + Sync {
    fn handle(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context, next: Next<'_>);
}

/// Adapter turning a plain function into a [`Handler`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F>(F);

/// Wrap a function or closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut ResponseWriter, &Request, &mut Context) + Send + Sync,
{
    HandlerFn(f)
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut ResponseWriter, &Request, &mut Context) + Send + Sync,
{
    fn serve(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context) {
        (self.0)(w, req, ctx)
    }
}

/// Adapter turning a plain function into a [`Middleware`].
#[derive(Clone, Copy)]
pub struct MiddlewareFn<F>(F);

/// Wrap a function or closure as a [`Middleware`].
pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(&mut ResponseWriter, &Request, &mut Context, Next<'_>) + Send + Sync,
{
    MiddlewareFn(f)
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(&mut ResponseWriter, &Request, &mut Context, Next<'_>) + Send + Sync,
{
    fn handle(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context, next: Next<'_>) {
        (self.0)(w, req, ctx, next)
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context) {
        (**self).serve(w, req, ctx)
    }
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn handle(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context, next: Next<'_>) {
        (**self).handle(w, req, ctx, next)
    }
}

/// Ordered middleware steps plus one terminal handler.
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<Arc<dyn Middleware>>,
    terminal: Option<Arc<dyn Handler>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a step before all existing steps.
    pub fn prepend<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.prepend_all(vec![Arc::new(middleware) as Arc<dyn Middleware>])
    }

    /// Insert steps, in the given order, before all existing steps.
    pub fn prepend_all(mut self, middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        let mut steps = middlewares;
        steps.append(&mut self.steps);
        self.steps = steps;
        self
    }

    /// Add a step after all existing steps.
    pub fn append<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.steps.push(Arc::new(middleware));
        self
    }

    pub fn append_all(mut self, middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        self.steps.extend(middlewares);
        self
    }

    /// Set the terminal handler, replacing any previous one.
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.terminal = Some(Arc::new(handler));
        self
    }

    /// A chain is routable once it has a terminal handler.
    pub fn is_routable(&self) -> bool {
        self.terminal.is_some()
    }

    /// Number of middleware steps, not counting the terminal.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Move steps and terminal of `other` onto this chain.
    pub(crate) fn merge(&mut self, other: Chain) {
        self.steps.extend(other.steps);
        self.terminal = other.terminal;
    }

    /// Run the chain from its first step.
    pub fn serve(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context) {
        Next {
            chain: self,
            cursor: 0,
        }
        .run(w, req, ctx)
    }
}

impl Handler for Chain {
    fn serve(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context) {
        Chain::serve(self, w, req, ctx)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("steps", &self.steps.len())
            .field("routable", &self.is_routable())
            .finish()
    }
}

/// The remainder of a chain, handed to each middleware step.
pub struct Next<'a> {
    chain: &'a Chain,
    cursor: usize,
}

impl Next<'_> {
    /// Continue with the following step, or the terminal handler once all
    /// steps have run. Past the terminal this does nothing.
    pub fn run(self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context) {
        let steps = &self.chain.steps;
        if let Some(step) = steps.get(self.cursor) {
            let next = Next {
                chain: self.chain,
                cursor: self.cursor + 1,
            };
            step.handle(w, req, ctx, next);
        } else if self.cursor == steps.len() {
            if let Some(terminal) = &self.chain.terminal {
                terminal.serve(w, req, ctx);
            }
        }
    }

    /// Steps still to run, including the terminal handler if present.
    pub fn remaining(&self) -> usize {
        let terminal = usize::from(self.chain.terminal.is_some());
        (self.chain.steps.len() + terminal).saturating_sub(self.cursor)
    }
}

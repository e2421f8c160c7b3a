//! Per-route access logging.

use std::time::Instant;

use crate::http::{Request, ResponseWriter};
use crate::routing::{Context, Middleware, Next};

use super::request_id::REQUEST_ID_VAR;

/// Logs method, path, status and latency once the rest of the chain returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl Middleware for AccessLog {
    fn handle(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context, next: Next<'_>) {
        let start = Instant::now();
        next.run(w, req, ctx);

        tracing::info!(
            request_id = ctx.var(REQUEST_ID_VAR).unwrap_or("unknown"),
            method = %req.method(),
            path = %req.uri().path(),
            status = w.status().as_u16(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Request served"
        );
    }
}

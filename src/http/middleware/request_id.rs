//! Request ID propagation into the route context.

use axum::http::HeaderValue;
use uuid::Uuid;

use crate::http::{Request, RequestIdExt, ResponseWriter, X_REQUEST_ID};
use crate::routing::{Context, Middleware, Next};

/// Context var holding the request ID.
pub const REQUEST_ID_VAR: &str = "request_id";

/// Copies `x-request-id` into the context (generating a UUID v4 when the
/// header is missing) and echoes it on the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestId;

impl Middleware for RequestId {
    fn handle(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context, next: Next<'_>) {
        let id = req
            .request_id()
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(value) = HeaderValue::from_str(&id) {
            w.headers_mut().insert(X_REQUEST_ID, value);
        }
        ctx.set_var(REQUEST_ID_VAR, id);
        next.run(w, req, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{handler_fn, Chain};
    use axum::body::Bytes;

    fn chain() -> Chain {
        Chain::new()
            .append(RequestId)
            .handler(handler_fn(|w, _, ctx| w.write_str(ctx.var(REQUEST_ID_VAR).unwrap_or(""))))
    }

    #[test]
    fn test_uses_incoming_header() {
        let req = axum::http::Request::builder()
            .header("x-request-id", "req-1")
            .body(Bytes::new())
            .unwrap();
        let mut w = ResponseWriter::new();
        chain().serve(&mut w, &req, &mut Context::new());
        assert_eq!(w.body(), b"req-1");
        assert_eq!(w.headers()[X_REQUEST_ID], "req-1");
    }

    #[test]
    fn test_generates_uuid() {
        let req = axum::http::Request::builder().body(Bytes::new()).unwrap();
        let mut w = ResponseWriter::new();
        chain().serve(&mut w, &req, &mut Context::new());
        let id = std::str::from_utf8(w.body()).unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}

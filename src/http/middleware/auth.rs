//! Bearer token check.
//! Rejects requests without the expected `Authorization` header.

use axum::http::{header, HeaderValue, StatusCode};

use crate::http::{Request, ResponseWriter};
use crate::routing::{Context, Middleware, Next};

/// Context var set to `"bearer"` once a request is authenticated.
pub const AUTH_VAR: &str = "auth";

/// Requires `Authorization: Bearer <token>`; anything else gets 401 and the
/// rest of the chain never runs.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    expected: String,
}

impl BearerAuth {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            expected: format!("Bearer {}", token.as_ref()),
        }
    }
}

impl Middleware for BearerAuth {
    fn handle(&self, w: &mut ResponseWriter, req: &Request, ctx: &mut Context, next: Next<'_>) {
        let authorized = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|value| value == self.expected);

        if !authorized {
            tracing::warn!(path = %req.uri().path(), "Rejected unauthenticated request");
            w.text(StatusCode::UNAUTHORIZED, "401 unauthorized\n");
            w.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            return;
        }

        ctx.set_var(AUTH_VAR, "bearer");
        next.run(w, req, ctx);
    }
}

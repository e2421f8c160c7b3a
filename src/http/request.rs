//! Request representation handed to routes.
//!
//! # Responsibilities
//! - Fix the request type every handler and middleware sees
//! - Expose the request ID assigned by the transport layer
//!
//! # Design Decisions
//! - The body is buffered before dispatch; handlers run synchronously and
//!   never poll a stream
//! - Request ID header name is shared with the tower-http layers

use axum::body::Bytes;
use axum::http::HeaderName;

/// An incoming request with its body fully buffered.
pub type Request = axum::http::Request<Bytes>;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Access to the request ID header.
pub trait RequestIdExt {
    /// Returns the request ID if the header is present and valid UTF-8.
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_header() {
        let req = axum::http::Request::builder()
            .header("X-Request-ID", "abc-123")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(req.request_id(), Some("abc-123"));

        let req = axum::http::Request::builder().body(Bytes::new()).unwrap();
        assert_eq!(req.request_id(), None);
    }
}

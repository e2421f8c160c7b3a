//! Response sink written by handlers.
//!
//! # Responsibilities
//! - Collect status, headers and body produced by the middleware chain
//! - Convert the collected response into an axum response
//!
//! # Design Decisions
//! - Dispatch returns nothing; every outcome is a write to the sink
//! - Body is buffered, handlers write with `std::io::Write` or helpers
//! - Status defaults to 200 OK, like an untouched writer in most servers

use std::io;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;

/// Buffered response sink passed to every handler and middleware.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Set `content-type`, replacing any previous value.
    pub fn set_content_type(&mut self, content_type: &'static str) {
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    /// Append text to the body.
    pub fn write_str(&mut self, s: &str) {
        self.body.extend_from_slice(s.as_bytes());
    }

    /// Append raw bytes to the body.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Serialize `value` as the JSON body and set the content type.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let encoded = serde_json::to_vec(value)?;
        self.set_content_type("application/json");
        self.body = encoded;
        Ok(())
    }

    /// Write a complete plain-text response with the given status.
    pub fn text(&mut self, status: StatusCode, body: &str) {
        self.status = status;
        self.set_content_type("text/plain; charset=utf-8");
        self.body.clear();
        self.write_str(body);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Discard everything written so far.
    pub fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(Bytes::from(self.body)));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::Method;
use tokio::net::TcpListener;

use pathmux::config::ServerConfig;
use pathmux::http::HttpServer;
use pathmux::lifecycle::Shutdown;
use pathmux::{Request, ResponseWriter, Router};

/// Build a body-less request.
pub fn request(method: Method, path: &str) -> Request {
    axum::http::Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

/// Dispatch `method path` through `router` and return the written response.
pub fn serve(router: &Router, method: Method, path: &str) -> ResponseWriter {
    let mut w = ResponseWriter::new();
    router.serve(&mut w, &request(method, path));
    w
}

/// Response body as UTF-8.
pub fn body(w: &ResponseWriter) -> String {
    String::from_utf8_lossy(w.body()).into_owned()
}

/// Start `router` on an ephemeral port. Drop or trigger the returned
/// `Shutdown` to stop it.
pub async fn spawn_server(router: Router, config: ServerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(router, config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Listener is already bound; give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// HTTP client that bypasses any system proxy and connection reuse.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the router from a validated config (built-in and static routes)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when routes are ready)
//! - `/admin/routes` is registered last so its snapshot includes everything

use std::io;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::middleware::request_id::REQUEST_ID_VAR;
use crate::http::middleware::{AccessLog, BearerAuth, RequestId};
use crate::http::{HttpServer, ResponseWriter};
use crate::lifecycle::shutdown::Shutdown;
use crate::routing::{handler_fn, Chain, RouteError, Router};

pub const HEALTH_PATH: &str = "/health";
pub const ADMIN_ROUTES_PATH: &str = "/admin/routes";

/// Error type for server startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route registration failed: {0}")]
    Route(#[from] RouteError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Serialize)]
struct RouteEntry {
    method: String,
    path: String,
}

/// Build the router: health check, static mounts, then the admin listing.
pub fn build_router(config: &ServerConfig) -> Result<Router, StartupError> {
    let mut router = Router::with_config(config.router);
    router.set_panic_handler(|w, _req, _payload| {
        w.text(StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n");
    });

    router.handle_chain(
        Method::GET,
        HEALTH_PATH,
        Chain::new().append(RequestId).handler(handler_fn(|w, _, ctx| {
            let body = serde_json::json!({
                "status": "ok",
                "request_id": ctx.var(REQUEST_ID_VAR),
            });
            write_json(w, &body);
        })),
    )?;

    for mount in &config.static_files {
        router.serve_files(&mount.path, &mount.root, None)?;
        tracing::info!(path = %mount.path, root = %mount.root, "Static files mounted");
    }

    let mut routes: Vec<RouteEntry> = router
        .routes()
        .into_iter()
        .map(|(method, path)| RouteEntry {
            method: method.to_string(),
            path,
        })
        .collect();
    routes.push(RouteEntry {
        method: Method::GET.to_string(),
        path: ADMIN_ROUTES_PATH.to_string(),
    });
    routes.sort_by(|a, b| (&a.method, &a.path).cmp(&(&b.method, &b.path)));
    let routes = Arc::new(routes);

    let mut admin = Chain::new().append(RequestId).append(AccessLog);
    match &config.auth.api_key {
        Some(key) => admin = admin.append(BearerAuth::new(key)),
        None => tracing::warn!("auth.api_key is unset; admin routes are unauthenticated"),
    }
    router.handle_chain(
        Method::GET,
        ADMIN_ROUTES_PATH,
        admin.handler(handler_fn(move |w, _, _| write_json(w, routes.as_slice()))),
    )?;

    Ok(router)
}

fn write_json<T: Serialize + ?Sized>(w: &mut ResponseWriter, value: &T) {
    if let Err(e) = w.json(value) {
        tracing::error!(error = %e, "Failed to encode JSON response");
        w.text(StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n");
    }
}

/// Build, bind and run until `shutdown` fires.
pub async fn serve(config: ServerConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let router = build_router(&config)?;
    let route_count = router.routes().len();

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    tracing::info!(
        address = %listener.local_addr()?,
        routes = route_count,
        strict_trailing_slash = config.router.strict_trailing_slash,
        "Listening for connections"
    );

    HttpServer::new(router, config)
        .run(listener, shutdown.subscribe())
        .await?;
    Ok(())
}

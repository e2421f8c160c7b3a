//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum app with a single fallback into the routing engine
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Buffer request bodies and hand them to the synchronous router
//! - Bind server to listener and stop on the shutdown broadcast
//!
//! # Design Decisions
//! - axum does no routing of its own; every path reaches `dispatch`
//! - Router dispatch runs on the blocking pool so slow handlers never stall
//!   the reactor
//! - A dispatch task that dies outside the router's panic boundary is a 500

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::{Request, RequestIdExt, ResponseWriter};
use crate::routing::Router;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
struct AppState {
    router: Arc<Router>,
    max_body_size: usize,
}

/// HTTP front end for a `Router`.
pub struct HttpServer {
    app: axum::Router,
}

impl HttpServer {
    /// Wrap `router` with the HTTP layers described by `config`.
    pub fn new(router: Router, config: ServerConfig) -> Self {
        let state = AppState {
            router: Arc::new(router),
            max_body_size: config.limits.max_body_size,
        };
        Self {
            app: Self::build_app(&config, state),
        }
    }

    /// Build the axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.limits.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The layered axum app, for in-process testing with `oneshot`.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Run the server until a value (or close) arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffer the body, then run the router on the blocking pool.
async fn dispatch(State(state): State<AppState>, request: axum::extract::Request) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "413 payload too large\n").into_response();
        }
    };
    let request = Request::from_parts(parts, bytes);
    let request_id = request.request_id().unwrap_or("unknown").to_owned();

    let router = state.router.clone();
    let served = tokio::task::spawn_blocking(move || {
        let mut w = ResponseWriter::new();
        router.serve(&mut w, &request);
        w
    })
    .await;

    match served {
        Ok(w) => w.into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n").into_response()
        }
    }
}

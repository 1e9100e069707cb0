//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the bridge handler
//! - Serve HTTP/1.1 and HTTP/2 per connection via hyper-util
//! - Wire up middleware (tracing, timeout, request ID)
//! - Register connections and force them closed on shutdown
//! - Dispatch requests to the resolution engine

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
    service::TowerToHyperService,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::address::RouteParams;
use crate::config::BridgeConfig;
use crate::engine::Engine;
use crate::http::request::{self, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::net::{ConnectionRegistry, Listener};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    /// User-agent substring that marks dev tools requests.
    pub dev_marker: Arc<str>,
}

/// HTTP front-end for the resolution engine.
pub struct BridgeServer {
    router: Router,
    registry: ConnectionRegistry,
    shutdown_timeout: Duration,
}

impl BridgeServer {
    pub fn new(config: &BridgeConfig, engine: Arc<Engine>) -> Self {
        let state = AppState {
            engine,
            dev_marker: Arc::from(config.session.user_agent_marker.as_str()),
        };

        Self {
            router: Self::build_router(config, state),
            registry: ConnectionRegistry::new(),
            shutdown_timeout: Duration::from_secs(config.timeouts.shutdown_secs),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BridgeConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request::request_id(req.headers()),
                )
            }))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/", get(bridge_handler))
            .route("/{*path}", get(bridge_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Live connection registry, shared with every connection task.
    pub fn registry(&self) -> ConnectionRegistry {
        self.registry.clone()
    }

    /// Run the server until `shutdown` triggers, then force every open
    /// connection closed and wait for them to drain.
    pub async fn run(self, listener: Listener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer, permit)) => {
                            let mut guard = self.registry.register();
                            let connection_id = guard.id();
                            let service = TowerToHyperService::new(self.router.clone());

                            tokio::spawn(async move {
                                let _permit = permit;
                                let builder = auto::Builder::new(TokioExecutor::new());
                                let connection = builder.serve_connection(TokioIo::new(stream), service);

                                tokio::select! {
                                    result = connection => {
                                        if let Err(e) = result {
                                            tracing::debug!(
                                                connection_id = %connection_id,
                                                peer_addr = %peer,
                                                error = %e,
                                                "Connection error"
                                            );
                                        }
                                    }
                                    _ = guard.closing() => {
                                        tracing::debug!(connection_id = %connection_id, "Connection closed by shutdown");
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            let backoff = e.backoff();
                            tracing::warn!(error = %e, backoff_ms = backoff.as_millis() as u64, "Accept failed");
                            if !backoff.is_zero() {
                                tokio::time::sleep(backoff).await;
                            }
                        }
                    }
                }
                _ = shutdown.wait() => break,
            }
        }

        drop(listener);
        self.registry.close_all();
        if tokio::time::timeout(self.shutdown_timeout, self.registry.wait_empty())
            .await
            .is_err()
        {
            tracing::warn!(
                remaining = self.registry.len(),
                "Connections still open after shutdown timeout"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Authorize, split the path into routing parameters, and resolve.
async fn bridge_handler(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let start_time = Instant::now();
    let path = uri.path();
    let mut protocol = "unknown";

    tracing::debug!(
        request_id = %request::request_id(&headers),
        path = %path,
        "Bridging request"
    );

    let outcome = match request::session_id(&headers, state.engine.host().as_ref(), &state.dev_marker).await {
        Ok(session_id) => match RouteParams::from_path(path) {
            Ok(ctx) => {
                protocol = ctx.protocol.as_str();
                state.engine.lookup(&session_id, ctx).await
            }
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    let response = match outcome {
        Ok(resolved) => resolved.into_response(),
        Err(e) => {
            tracing::debug!(path = %path, status = %e.status(), error = %e, "Request failed");
            e.into_response()
        }
    };
    metrics::record_request(protocol, response.status().as_u16(), start_time);
    response
}

//! # HTTP Server
//!
//! Main HTTP server combining the endpoint routers with the cross-cutting
//! layers: CORS, security headers, panic capture, body limit and request
//! tracing.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::config::{HttpServerConfig, MAX_BODY_BYTES};
use super::errors::{ApiError, HIDDEN_INTERNAL_MESSAGE};
use super::game_routes::{game_routes, GameDataState};
use super::health_routes::health_routes;
use crate::observability::Event;
use crate::storage::StoreHandle;

/// HTTP server for the game data API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server backed by `store`
    pub fn new(config: HttpServerConfig, store: Arc<StoreHandle>) -> Self {
        let router = Self::build_router(&config, store);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, store: Arc<StoreHandle>) -> Router {
        let state = Arc::new(GameDataState::new(store, config.expose_errors));

        Router::new()
            // Health check at root level
            .merge(health_routes(Arc::clone(&state)))
            // Game data routes under /api
            .nest("/api", game_routes(state))
            .fallback(not_found_handler)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(CatchPanicLayer::custom(panic_responder(config.expose_errors)))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static("1; mode=block"),
            ))
            .layer(Self::cors_layer(config))
            .layer(TraceLayer::new_for_http())
    }

    /// CORS restricted to the configured origins
    fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
        let origins: Vec<HeaderValue> = config
            .allowed_origins()
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server, stopping on Ctrl-C or SIGTERM
    pub async fn start(self) -> Result<(), std::io::Error> {
        self.start_with_shutdown(shutdown_signal()).await
    }

    /// Start the HTTP server, draining connections once `signal` resolves
    pub async fn start_with_shutdown<F>(self, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        info!(event = %Event::Serving, %addr, "game data API listening");
        info!("Health check: http://{}/health", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

/// Renders a caught panic as a JSON 500.
fn panic_responder(
    expose: bool,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |payload: Box<dyn Any + Send + 'static>| {
        let detail = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "request handler panicked".to_string()
        };

        error!(panic = %detail, "request handler panicked");

        let message = if expose {
            detail
        } else {
            HIDDEN_INTERNAL_MESSAGE.to_string()
        };
        ApiError::Internal(message).into_response()
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!(event = %Event::ShutdownStart, "shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StoreConfig, StoreTarget};

    #[tokio::test]
    async fn test_server_with_custom_port() {
        let store = StoreHandle::connect(StoreTarget::Memory, StoreConfig::default());
        let server = HttpServer::new(HttpServerConfig::with_port(8080), store);
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_panic_message_hidden_when_not_exposed() {
        let respond = panic_responder(false);
        let response = respond(Box::new("boom"));
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}

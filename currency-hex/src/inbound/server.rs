//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{Json, Router, body::Body, http::Request, routing::get};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use currency_types::RateReader;

use super::handlers::{self, AppState};
use crate::RateService;
use crate::openapi::ApiDoc;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP Server for the rates API.
pub struct HttpServer<R: RateReader> {
    state: Arc<AppState<R>>,
}

impl<R: RateReader> HttpServer<R> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: RateService<R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let request_id = axum::http::HeaderName::from_static(REQUEST_ID_HEADER);

        // Outermost first: assign the id, log under it, echo it back.
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(request_id));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/v1/rates/latest", get(handlers::latest_rates::<R>))
            .route(
                "/api/v1/rates/history/{currency}",
                get(handlers::historical_rates::<R>),
            )
            .route(
                "/api-docs/openapi.json",
                get(|| async { Json(ApiDoc::openapi()) }),
            )
            .layer(middleware)
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}

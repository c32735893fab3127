//! HTTP server plumbing shared by both services.
//!
//! Covers the health route, the middleware stack, the outbound HTTP client,
//! and serving a router with a bounded graceful shutdown.

use crate::error::ErrorBody;
use anyhow::{Context as _, Result};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::future::{Future, IntoFuture};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Timeout for each outbound call to a collaborator.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Overall budget for handling one inbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long in-flight requests may keep running after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status (always "healthy" if reachable).
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Creates the health check routes for `service`.
pub fn health_routes<S>(service: &'static str, version: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/health",
        get(move || async move {
            Json(HealthResponse {
                status: "healthy".to_string(),
                service: service.to_string(),
                version: version.to_string(),
            })
        }),
    )
}

/// Wraps a service router in the common middleware stack.
///
/// Requests running longer than `request_timeout` are answered with 408 and
/// their handler future is dropped. A panicking handler is answered with 500
/// and `{"message": panic_message}`.
#[allow(deprecated)]
pub fn with_middleware(
    router: Router,
    request_timeout: Duration,
    panic_message: &'static str,
) -> Router {
    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(panic_response(panic_message)))
        .layer(TraceLayer::new_for_http())
}

fn panic_response(
    message: &'static str,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |panic: Box<dyn Any + Send + 'static>| {
        let detail = panic
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        tracing::error!(panic = detail, "Handler panicked");
        ErrorBody::new(message).into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Builds the client used for calls to collaborators.
///
/// Every request made through it is bounded by [`UPSTREAM_TIMEOUT`].
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn upstream_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

/// Serves `app` until SIGINT/SIGTERM, then drains for at most `grace`.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, app: Router, grace: Duration) -> Result<()> {
    serve_until(listener, app, shutdown_signal(), grace).await
}

/// Serves `app` until `signal` completes, then drains for at most `grace`.
///
/// Once the signal fires no new connections are accepted. Requests already in
/// flight get `grace` to finish before the server is dropped.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = drain_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.context("server error"),
        () = signal => {}
    }

    let _ = drain_tx.send(());
    if let Ok(result) = tokio::time::timeout(grace, server).await {
        result.context("server error during shutdown")?;
    } else {
        tracing::warn!(
            grace_secs = grace.as_secs(),
            "In-flight requests did not finish in time, forcing shutdown"
        );
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

//! CEP Weather Back Service
//!
//! Resolves a Brazilian postal code to its city through the postal code
//! directory, fetches the city's current temperature from the weather directory
//! and answers with the temperature in Celsius, Fahrenheit and Kelvin.
//!
//! # Architecture
//!
//! The server is built on Axum and Tokio:
//! - `GET /weather?cep=` continues the caller's trace and opens one span per
//!   lookup step
//! - `GET /health` for load balancers
//!
//! # Example
//!
//! ```no_run
//! use service_b::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
pub mod error;
mod resolvers;
mod routes;
mod state;

pub use config::Config;
pub use error::BackError;
pub use resolvers::{CityResolver, TemperatureResolver};
pub use routes::WeatherQuery;
pub use state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use shared::server::{
    health_routes, serve, upstream_client, with_middleware, REQUEST_TIMEOUT, SHUTDOWN_GRACE,
};
use shared::telemetry::{init_tracer_provider, Telemetry};
use std::time::Duration;
use tokio::net::TcpListener;

/// Name reported in spans and on the health endpoint.
pub const SERVICE_NAME: &str = "service-b";

/// Runs the back service.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the back service with the provided configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The tracer provider or HTTP client cannot be built
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    tracing::info!(
        host = %config.host,
        port = %config.port,
        viacep = %config.viacep_base_url,
        weatherapi = %config.weatherapi_base_url,
        "Service B starting"
    );

    let provider = init_tracer_provider(SERVICE_NAME, config.otlp_endpoint.as_deref())?;
    let state = AppState::new(
        &config,
        upstream_client()?,
        Telemetry::new(&provider, SERVICE_NAME),
    );

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!(addr = %listener.local_addr()?, "Listening for connections");

    let served = serve(listener, create_router(state), SHUTDOWN_GRACE).await;

    let flushed = tokio::task::spawn_blocking(move || provider.shutdown()).await?;
    if let Err(err) = flushed {
        tracing::warn!(error = %err, "Failed to flush spans on shutdown");
    }

    served
}

/// Creates the application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    create_router_with_timeout(state, REQUEST_TIMEOUT)
}

/// Creates the application router with a custom per-request timeout.
pub fn create_router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .merge(routes::weather_routes())
        .merge(health_routes(SERVICE_NAME, env!("CARGO_PKG_VERSION")))
        .with_state(state);
    with_middleware(router, request_timeout, "internal error")
}

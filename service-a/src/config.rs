//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};

/// Front service configuration.
///
/// Configuration values can be set via environment variables:
/// - `SERVICE_B_URL`: Full URL of the back service's weather endpoint (required)
/// - `HOST`: The host address to bind to (default: "0.0.0.0")
/// - `PORT`: The port to listen on (default: 8080)
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP/gRPC collector (optional)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Weather endpoint of the back service, e.g. `http://service-b:8081/weather`.
    pub service_b_url: String,
    /// Trace collector endpoint; spans are not exported when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Creates a configuration with default bind address for `service_b_url`.
    #[must_use]
    pub fn new(service_b_url: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            service_b_url: service_b_url.into(),
            otlp_endpoint: None,
        }
    }

    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SERVICE_B_URL` is missing or empty
    /// - `PORT` is set but cannot be parsed as a valid port number
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration reading variables through `lookup`.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let service_b_url =
            var("SERVICE_B_URL").context("SERVICE_B_URL environment variable not set")?;

        let mut config = Self::new(service_b_url);

        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("invalid PORT value: {port}"))?;
        }
        config.otlp_endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT");

        Ok(config)
    }
}

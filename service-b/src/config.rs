//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};

/// Default ViaCEP endpoint.
pub const DEFAULT_VIACEP_BASE_URL: &str = "https://viacep.com.br";

/// Default WeatherAPI endpoint.
pub const DEFAULT_WEATHERAPI_BASE_URL: &str = "https://api.weatherapi.com";

/// Back service configuration.
///
/// Configuration values can be set via environment variables:
/// - `WEATHERAPI_KEY`: WeatherAPI key (required)
/// - `HOST`: The host address to bind to (default: "0.0.0.0")
/// - `PORT`: The port to listen on (default: 8081)
/// - `VIACEP_BASE_URL`: Postal code directory endpoint (default: ViaCEP)
/// - `WEATHERAPI_BASE_URL`: Weather directory endpoint (default: WeatherAPI)
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP/gRPC collector (optional)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Key sent to the weather directory.
    pub weather_api_key: String,
    /// Base URL of the postal code directory.
    pub viacep_base_url: String,
    /// Base URL of the weather directory.
    pub weatherapi_base_url: String,
    /// Trace collector endpoint; spans are not exported when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Creates a configuration with default endpoints and the given key.
    #[must_use]
    pub fn new(weather_api_key: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            weather_api_key: weather_api_key.into(),
            viacep_base_url: DEFAULT_VIACEP_BASE_URL.to_string(),
            weatherapi_base_url: DEFAULT_WEATHERAPI_BASE_URL.to_string(),
            otlp_endpoint: None,
        }
    }

    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `WEATHERAPI_KEY` is missing or empty
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

        let weather_api_key =
            var("WEATHERAPI_KEY").context("WEATHERAPI_KEY environment variable not set")?;

        let mut config = Self::new(weather_api_key);

        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("invalid PORT value: {port}"))?;
        }
        if let Some(url) = var("VIACEP_BASE_URL") {
            config.viacep_base_url = url;
        }
        if let Some(url) = var("WEATHERAPI_BASE_URL") {
            config.weatherapi_base_url = url;
        }
        config.otlp_endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT");

        Ok(config)
    }
}

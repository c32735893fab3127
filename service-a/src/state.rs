//! Application state module.
//!
//! Defines the immutable state that is passed to route handlers.

use crate::client::WeatherClient;
use crate::config::Config;
use shared::telemetry::Telemetry;

/// State shared by all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    telemetry: Telemetry,
    weather: WeatherClient,
}

impl AppState {
    /// Creates the state for `config`.
    #[must_use]
    pub fn new(config: &Config, client: reqwest::Client, telemetry: Telemetry) -> Self {
        Self {
            weather: WeatherClient::new(client, config.service_b_url.clone(), telemetry.clone()),
            telemetry,
        }
    }

    /// Returns the tracer and propagator.
    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Returns the back service client.
    #[must_use]
    pub fn weather(&self) -> &WeatherClient {
        &self.weather
    }
}

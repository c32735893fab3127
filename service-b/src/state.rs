//! Application state module.
//!
//! Defines the immutable state that is passed to route handlers.

use crate::config::Config;
use crate::resolvers::{CityResolver, TemperatureResolver};
use shared::telemetry::Telemetry;

/// State shared by all request handlers.
///
/// Built once at startup from [`Config`]; nothing in it changes while requests
/// are being served.
#[derive(Clone, Debug)]
pub struct AppState {
    telemetry: Telemetry,
    cities: CityResolver,
    temperatures: TemperatureResolver,
}

impl AppState {
    /// Creates the state for `config`, sharing one HTTP client between both
    /// resolvers.
    #[must_use]
    pub fn new(config: &Config, client: reqwest::Client, telemetry: Telemetry) -> Self {
        Self {
            cities: CityResolver::new(client.clone(), &config.viacep_base_url, telemetry.clone()),
            temperatures: TemperatureResolver::new(
                client,
                &config.weatherapi_base_url,
                config.weather_api_key.clone(),
                telemetry.clone(),
            ),
            telemetry,
        }
    }

    /// Returns the tracer and propagator.
    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Returns the postal code directory client.
    #[must_use]
    pub fn cities(&self) -> &CityResolver {
        &self.cities
    }

    /// Returns the weather directory client.
    #[must_use]
    pub fn temperatures(&self) -> &TemperatureResolver {
        &self.temperatures
    }
}

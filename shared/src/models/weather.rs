//! Temperature result model.
//!
//! Defines the response shared by both services and the unit conversions.

use serde::{Deserialize, Serialize};

/// Multiplier applied to Celsius when converting to Fahrenheit.
pub const FAHRENHEIT_MULTIPLIER: f64 = 1.8;
/// Offset added after scaling when converting to Fahrenheit.
pub const FAHRENHEIT_OFFSET: f64 = 32.0;
/// Offset added to Celsius when converting to Kelvin.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Converts a Celsius reading to Fahrenheit.
#[must_use]
pub fn celsius_to_fahrenheit(temp_c: f64) -> f64 {
    temp_c * FAHRENHEIT_MULTIPLIER + FAHRENHEIT_OFFSET
}

/// Converts a Celsius reading to Kelvin.
#[must_use]
pub fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + KELVIN_OFFSET
}

/// Current temperature of a city in three scales.
///
/// Values are serialized as computed; nothing is rounded.
///
/// # Example
///
/// ```
/// use shared::models::TemperatureResult;
///
/// let result = TemperatureResult::from_celsius("Curitiba", 25.0);
///
/// assert_eq!(result.temp_f, 77.0);
/// assert_eq!(result.temp_k, 298.15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureResult {
    /// City name as returned by the postal code directory.
    pub city: String,

    /// Temperature in degrees Celsius.
    #[serde(rename = "temp_C")]
    pub temp_c: f64,

    /// Temperature in degrees Fahrenheit.
    #[serde(rename = "temp_F")]
    pub temp_f: f64,

    /// Temperature in Kelvin.
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
}

impl TemperatureResult {
    /// Builds the result from a single Celsius reading.
    #[must_use]
    pub fn from_celsius(city: impl Into<String>, temp_c: f64) -> Self {
        Self {
            city: city.into(),
            temp_c,
            temp_f: celsius_to_fahrenheit(temp_c),
            temp_k: celsius_to_kelvin(temp_c),
        }
    }
}

//! API route definitions.
//!
//! This module organizes all HTTP routes for the back service.

mod weather;

pub use weather::{weather_routes, WeatherQuery};

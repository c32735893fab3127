//! Clients for the external lookup directories.
//!
//! Each resolver opens its own client span under the handler's span and
//! classifies every failure into an [`shared::error::ErrorOutcome`].

mod city;
mod temperature;

pub use city::CityResolver;
pub use temperature::TemperatureResolver;

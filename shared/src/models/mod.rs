//! Data models for the CEP weather services.
//!
//! This module contains the postal code and temperature structures exchanged
//! between the front service, the back service and clients.

pub mod cep;
pub mod weather;

pub use cep::{CepRequest, PostalCode, CEP_PATTERN};
pub use weather::{celsius_to_fahrenheit, celsius_to_kelvin, TemperatureResult};

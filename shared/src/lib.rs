//! CEP Weather Shared Library
//!
//! This crate contains the types and plumbing shared by the front service
//! (`service-a`) and the back service (`service-b`).
//!
//! # Modules
//!
//! - [`models`] - Postal code and temperature data models
//! - [`error`] - Error taxonomy and its HTTP status mapping
//! - [`telemetry`] - Tracer, trace-context propagation and span scopes
//! - [`server`] - Health route, outbound client and graceful serving
//!
//! # Example
//!
//! ```
//! use shared::models::{PostalCode, TemperatureResult};
//!
//! let cep = PostalCode::parse("87043480").unwrap();
//! let result = TemperatureResult::from_celsius("Maringá", 28.5);
//!
//! assert_eq!(cep.as_str(), "87043480");
//! assert_eq!(result.temp_k, 28.5 + 273.15);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod models;
pub mod server;
pub mod telemetry;

/// Re-export common dependencies for convenience.
pub use opentelemetry;
pub use serde;
pub use serde_json;

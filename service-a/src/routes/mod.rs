//! API route definitions.

mod cep;

pub use cep::cep_routes;

//! CEP Weather Back Service Binary
//!
//! Entry point for the service resolving postal codes to temperatures.

#![deny(unsafe_code)]

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    shared::telemetry::init_logging();

    service_b::run_server().await
}

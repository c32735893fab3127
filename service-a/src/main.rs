//! CEP Weather Front Service Binary
//!
//! Entry point for the service accepting postal codes from clients.

#![deny(unsafe_code)]

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    shared::telemetry::init_logging();

    service_a::run_server().await
}

//! CEP Weather CLI
//!
//! Command-line client for the front service. Each lookup starts its own
//! trace, so the CLI call shows up as the root of the distributed trace.
//!
//! # Usage
//!
//! ```bash
//! cep-weather --help
//! cep-weather health
//! cep-weather lookup 87043480
//! cep-weather --api-url http://localhost:8080 lookup 01001000
//! ```

#![deny(unsafe_code)]

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use opentelemetry_semantic_conventions::trace::HTTP_RESPONSE_STATUS_CODE;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use shared::error::UpstreamError;
use shared::models::CepRequest;
use shared::server::upstream_client;
use shared::telemetry::{init_tracer_provider, Telemetry};

/// Name reported in spans.
const CLI_NAME: &str = "cep-weather";

/// CEP Weather CLI - temperature lookup by Brazilian postal code
#[derive(Parser)]
#[command(name = "cep-weather")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Front service URL
    #[arg(
        short,
        long,
        env = "CEP_WEATHER_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the current temperature for a postal code
    Lookup {
        /// Eight-digit postal code, e.g. 87043480
        cep: String,
    },
    /// Check front service health
    Health,
}

/// Status and raw body of a front service response.
#[derive(Debug)]
struct Reply {
    status: StatusCode,
    body: String,
}

impl Reply {
    /// Prints the body, pretty-printed when it is JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not a success.
    fn print(&self) -> Result<()> {
        match serde_json::from_str::<serde_json::Value>(&self.body) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{}", self.body),
        }
        if !self.status.is_success() {
            bail!("request failed with status {}", self.status);
        }
        Ok(())
    }
}

fn endpoint(api_url: &str, path: &str) -> String {
    format!("{}{path}", api_url.trim_end_matches('/'))
}

/// Posts `cep` to the front service inside a `cli-lookup` span.
async fn post_lookup(
    client: &reqwest::Client,
    telemetry: &Telemetry,
    api_url: &str,
    cep: &str,
) -> Result<Reply> {
    let scope = telemetry.start_span("cli-lookup", SpanKind::Client, &Context::new());
    scope.set_attribute(KeyValue::new("cep", cep.to_string()));
    tracing::debug!(cep, trace_id = %scope.trace_id(), "Sending lookup");

    let mut headers = HeaderMap::new();
    telemetry.inject(scope.context(), &mut headers);

    let result = async {
        let response = client
            .post(endpoint(api_url, "/service-a"))
            .headers(headers)
            .json(&CepRequest::new(cep))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok::<_, reqwest::Error>(Reply { status, body })
    }
    .await;

    match &result {
        Ok(reply) => {
            scope.set_attribute(KeyValue::new(
                HTTP_RESPONSE_STATUS_CODE,
                i64::from(reply.status.as_u16()),
            ));
            if reply.status.is_success() {
                scope.succeed();
            } else {
                scope.fail(&UpstreamError::Status(reply.status));
            }
        }
        Err(err) => scope.fail(err),
    }

    result.with_context(|| format!("failed to reach {api_url}"))
}

async fn lookup(api_url: &str, cep: &str) -> Result<()> {
    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .filter(|value| !value.is_empty());
    let provider = init_tracer_provider(CLI_NAME, otlp_endpoint.as_deref())?;
    let telemetry = Telemetry::new(&provider, CLI_NAME);

    let reply = post_lookup(&upstream_client()?, &telemetry, api_url, cep).await;

    let flushed = tokio::task::spawn_blocking(move || provider.shutdown()).await?;
    if let Err(err) = flushed {
        tracing::warn!(error = %err, "Failed to flush spans");
    }

    reply?.print()
}

async fn health(api_url: &str) -> Result<()> {
    let response = upstream_client()?
        .get(endpoint(api_url, "/health"))
        .send()
        .await
        .with_context(|| format!("failed to reach {api_url}"))?;

    Reply {
        status: response.status(),
        body: response.text().await?,
    }
    .print()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Lookup { cep }) => lookup(&cli.api_url, &cep).await,
        Some(Commands::Health) => health(&cli.api_url).await,
        None => {
            println!("CEP Weather CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

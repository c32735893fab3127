//! Distributed tracing and logging setup.
//!
//! Each service owns a [`Telemetry`] handle holding its tracer and the W3C
//! trace-context propagator. Handlers receive it through their state and use it
//! to extract the inbound context, open spans and inject the outbound context.
//!
//! Spans are held by a [`SpanScope`] guard. A scope is closed exactly once:
//! either explicitly through [`SpanScope::finish`] (and friends), or by `Drop`
//! on early return, cancellation or panic, in which case the span is marked as
//! an error before it ends.

use anyhow::{Context as _, Result};
use axum::http::HeaderMap;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, TraceId, Tracer, TracerProvider};
use opentelemetry::{Context, KeyValue};
use opentelemetry_http::{HeaderExtractor, HeaderInjector};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use std::error::Error;

/// Initializes the `tracing` subscriber.
///
/// Log level defaults to `info` and can be overridden with `RUST_LOG`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Builds the tracer provider for a service.
///
/// When `otlp_endpoint` is set, spans are batched and exported over OTLP/gRPC
/// to the collector. Without an endpoint spans are still created and
/// propagated, they are just not exported anywhere.
///
/// # Errors
///
/// Returns an error if the OTLP exporter cannot be built.
pub fn init_tracer_provider(
    service_name: &'static str,
    otlp_endpoint: Option<&str>,
) -> Result<SdkTracerProvider> {
    let resource = Resource::builder().with_service_name(service_name).build();
    let mut builder = SdkTracerProvider::builder().with_resource(resource);

    if let Some(endpoint) = otlp_endpoint {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()
            .context("failed to build OTLP span exporter")?;
        builder = builder.with_batch_exporter(exporter);
        tracing::info!(service = service_name, endpoint, "Exporting spans over OTLP");
    }

    Ok(builder.build())
}

/// Tracer and propagator for one service.
#[derive(Clone, Debug)]
pub struct Telemetry {
    tracer: SdkTracer,
    propagator: TraceContextPropagator,
}

impl Telemetry {
    /// Creates a handle whose spans are attributed to `scope`.
    #[must_use]
    pub fn new(provider: &SdkTracerProvider, scope: &'static str) -> Self {
        Self {
            tracer: provider.tracer(scope),
            propagator: TraceContextPropagator::new(),
        }
    }

    /// Extracts the remote parent context from inbound headers.
    ///
    /// Missing or invalid headers yield an empty context, so the next span
    /// started under it becomes the root of a new trace.
    #[must_use]
    pub fn extract(&self, headers: &HeaderMap) -> Context {
        self.propagator
            .extract_with_context(&Context::new(), &HeaderExtractor(headers))
    }

    /// Writes `cx` into outbound headers.
    pub fn inject(&self, cx: &Context, headers: &mut HeaderMap) {
        self.propagator
            .inject_context(cx, &mut HeaderInjector(headers));
    }

    /// Starts a span named `name` under `parent`.
    #[must_use]
    pub fn start_span(&self, name: &'static str, kind: SpanKind, parent: &Context) -> SpanScope {
        let span = self
            .tracer
            .span_builder(name)
            .with_kind(kind)
            .start_with_context(&self.tracer, parent);

        SpanScope {
            cx: parent.with_span(span),
            closed: false,
        }
    }
}

/// Guard owning one open span.
#[derive(Debug)]
#[must_use = "dropping a SpanScope immediately closes the span as an error"]
pub struct SpanScope {
    cx: Context,
    closed: bool,
}

impl SpanScope {
    /// Context carrying this span, used as parent for child spans and for
    /// injection into outbound requests.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.cx
    }

    /// Trace id of this span.
    #[must_use]
    pub fn trace_id(&self) -> TraceId {
        self.cx.span().span_context().trace_id()
    }

    /// Records an attribute on the span.
    pub fn set_attribute(&self, attribute: KeyValue) {
        self.cx.span().set_attribute(attribute);
    }

    /// Records an error event without closing the span.
    pub fn record_error(&self, err: &dyn Error) {
        self.cx.span().record_error(err);
    }

    /// Closes the span with an `Ok` status.
    pub fn succeed(mut self) {
        self.close(Status::Ok);
    }

    /// Records `err` and closes the span with an error status.
    pub fn fail(mut self, err: &dyn Error) {
        self.cx.span().record_error(err);
        self.close(Status::error(err.to_string()));
    }

    /// Closes the span according to `result`.
    pub fn finish<T, E: Error>(self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.succeed(),
            Err(err) => self.fail(err),
        }
    }

    fn close(&mut self, status: Status) {
        if self.closed {
            return;
        }
        self.closed = true;
        let span = self.cx.span();
        span.set_status(status);
        span.end();
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let reason = if std::thread::panicking() {
            "panicked before completion"
        } else {
            "dropped before completion"
        };
        self.close(Status::error(reason));
    }
}

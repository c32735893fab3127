//! End-to-end tests across both services.
//!
//! A real back service listens on a local port with mock postal code and
//! weather directories behind it; the front service is driven in-process.
//! Both report spans to their own in-memory exporter.

use axum::http::StatusCode;
use httpmock::prelude::*;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use serde_json::json;
use shared::server::upstream_client;
use shared::telemetry::Telemetry;
use tokio::net::TcpListener;

use super::common::{post, test_app_with_url, TestApp};

/// A back service running on a local port.
struct BackService {
    url: String,
    exporter: InMemorySpanExporter,
    _provider: SdkTracerProvider,
}

impl BackService {
    fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }
}

async fn spawn_back_service(viacep: &MockServer, weatherapi: &MockServer) -> BackService {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();

    let mut config = service_b::Config::new("test-key");
    config.viacep_base_url = viacep.base_url();
    config.weatherapi_base_url = weatherapi.base_url();
    let state = service_b::AppState::new(
        &config,
        upstream_client().unwrap(),
        Telemetry::new(&provider, service_b::SERVICE_NAME),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = service_b::create_router(state);
    tokio::spawn(async move { axum::serve(listener, router).await });

    BackService {
        url: format!("http://{addr}/weather"),
        exporter,
        _provider: provider,
    }
}

async fn mock_directories(viacep: &MockServer, weatherapi: &MockServer, weather_status: u16) {
    viacep
        .mock_async(|when, then| {
            when.method(GET).path("/ws/87043480/json/");
            then.status(200)
                .json_body(json!({"cep": "87043480", "localidade": "Maringá"}));
        })
        .await;
    weatherapi
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/current.json")
                .query_param("q", "Maringá");
            if weather_status == 200 {
                then.status(200)
                    .json_body(json!({"current": {"temp_c": 28.5}}));
            } else {
                then.status(weather_status)
                    .json_body(json!({"error": {"message": "boom"}}));
            }
        })
        .await;
}

fn span<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
    spans
        .iter()
        .find(|span| span.name == name)
        .unwrap_or_else(|| panic!("missing span {name}"))
}

async fn front_and_back(weather_status: u16) -> (TestApp, BackService, MockServer, MockServer) {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    mock_directories(&viacep, &weatherapi, weather_status).await;
    let back = spawn_back_service(&viacep, &weatherapi).await;
    let front = test_app_with_url(&back.url);
    (front, back, viacep, weatherapi)
}

#[tokio::test]
async fn test_cep_resolves_across_services() {
    let (front, _back, _viacep, _weatherapi) = front_and_back(200).await;

    let (status, response) = post(front.router.clone(), r#"{"cep": "87043480"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({
            "city": "Maringá",
            "temp_C": 28.5,
            "temp_F": 28.5 * 1.8 + 32.0,
            "temp_K": 28.5 + 273.15,
        })
    );
}

#[tokio::test]
async fn test_one_trace_spans_both_services() {
    let (front, back, _viacep, _weatherapi) = front_and_back(200).await;

    let (status, _) = post(front.router.clone(), r#"{"cep": "87043480"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let front_spans = front.finished_spans();
    let back_spans = back.finished_spans();
    assert_eq!(front_spans.len(), 3);
    assert_eq!(back_spans.len(), 6);

    let trace_id = span(&front_spans, "handle-cep").span_context.trace_id();
    for span in front_spans.iter().chain(&back_spans) {
        assert_eq!(span.span_context.trace_id(), trace_id, "{}", span.name);
    }

    let call = span(&front_spans, "call-downstream");
    let handle = span(&back_spans, "handle-weather");
    assert_eq!(handle.parent_span_id, call.span_context.span_id());
}

#[tokio::test]
async fn test_weather_failure_propagates_as_500() {
    let (front, back, _viacep, _weatherapi) = front_and_back(500).await;

    let (status, response) = post(front.router.clone(), r#"{"cep": "87043480"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, json!({"message": "failed to get weather data"}));

    let back_spans = back.finished_spans();
    assert!(matches!(
        span(&back_spans, "handle-weather").status,
        opentelemetry::trace::Status::Error { .. }
    ));
}

#[tokio::test]
async fn test_unknown_cep_propagates_as_404() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    viacep
        .mock_async(|when, then| {
            when.method(GET).path("/ws/00000000/json/");
            then.status(200).json_body(json!({"erro": "true"}));
        })
        .await;
    let back = spawn_back_service(&viacep, &weatherapi).await;
    let front = test_app_with_url(&back.url);

    let (status, response) = post(front.router.clone(), r#"{"cep": "00000000"}"#).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response, json!({"message": "can not find zipcode"}));
}

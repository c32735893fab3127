//! Weather lookup endpoint.
//!
//! Resolves a postal code to its city and the city's current temperature.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use opentelemetry_semantic_conventions::trace::HTTP_RESPONSE_STATUS_CODE;
use serde::Deserialize;
use shared::error::ErrorOutcome;
use shared::models::{PostalCode, TemperatureResult};
use shared::telemetry::{SpanScope, Telemetry};

use crate::error::BackError;
use crate::state::AppState;

/// Query parameters of `GET /weather`.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    /// Raw postal code; missing becomes empty and fails validation.
    #[serde(default)]
    pub cep: String,
}

/// Creates the weather routes.
pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/weather", get(get_weather))
}

/// Handler for `GET /weather?cep=`.
///
/// Opens the `handle-weather` root span under the caller's trace context and
/// answers 200, 404, 422 or 500 depending on the outcome.
async fn get_weather(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<TemperatureResult>, BackError> {
    let parent = state.telemetry().extract(&headers);
    let scope = state
        .telemetry()
        .start_span("handle-weather", SpanKind::Server, &parent);

    let raw = query.map(|Query(query)| query.cep).unwrap_or_default();
    tracing::info!(cep = %raw, trace_id = %scope.trace_id(), "Weather request received");

    let result = resolve_weather(&state, &raw, &scope).await;

    let status = match &result {
        Ok(weather) => {
            tracing::info!(
                cep = %raw,
                city = %weather.city,
                temp_c = weather.temp_c,
                "Weather resolved"
            );
            axum::http::StatusCode::OK
        }
        Err(err) => {
            tracing::warn!(cep = %raw, kind = %err.kind(), error = %err, "Weather lookup failed");
            BackError::status_for(err)
        }
    };
    scope.set_attribute(KeyValue::new(
        HTTP_RESPONSE_STATUS_CODE,
        i64::from(status.as_u16()),
    ));
    scope.finish(&result);

    result.map(Json).map_err(BackError::from)
}

/// Runs validation and both lookups under `scope`.
async fn resolve_weather(
    state: &AppState,
    raw: &str,
    scope: &SpanScope,
) -> Result<TemperatureResult, ErrorOutcome> {
    let cep = PostalCode::parse(raw)?;
    scope.set_attribute(KeyValue::new("cep", cep.to_string()));

    let city = state.cities().resolve(&cep, scope.context()).await?;
    scope.set_attribute(KeyValue::new("city", city.clone()));

    let temp_c = state.temperatures().resolve(&city, scope.context()).await?;

    Ok(convert_temperatures(
        state.telemetry(),
        city,
        temp_c,
        scope.context(),
    ))
}

/// Computes Fahrenheit and Kelvin inside a `convert-temperatures` span.
fn convert_temperatures(
    telemetry: &Telemetry,
    city: String,
    temp_c: f64,
    parent: &Context,
) -> TemperatureResult {
    let scope = telemetry.start_span("convert-temperatures", SpanKind::Internal, parent);

    let result = TemperatureResult::from_celsius(city, temp_c);
    scope.set_attribute(KeyValue::new("temp_C", result.temp_c));
    scope.set_attribute(KeyValue::new("temp_F", result.temp_f));
    scope.set_attribute(KeyValue::new("temp_K", result.temp_k));

    scope.succeed();
    result
}

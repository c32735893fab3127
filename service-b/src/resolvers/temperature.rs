//! City to current temperature lookup (WeatherAPI).

use axum::http::StatusCode;
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use opentelemetry_semantic_conventions::trace::HTTP_RESPONSE_STATUS_CODE;
use serde::Deserialize;
use shared::error::{ErrorOutcome, UpstreamError};
use shared::telemetry::Telemetry;

/// Body returned by the weather directory.
#[derive(Debug, Deserialize)]
pub struct WeatherApiResponse {
    /// Current conditions.
    pub current: CurrentConditions,
}

/// Current conditions block of [`WeatherApiResponse`].
#[derive(Debug, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in degrees Celsius.
    pub temp_c: f64,
}

/// Resolves city names to their current Celsius temperature.
#[derive(Clone, Debug)]
pub struct TemperatureResolver {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    telemetry: Telemetry,
}

impl TemperatureResolver {
    /// Creates a resolver querying `base_url` with `api_key`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            telemetry,
        }
    }

    /// Fetches the current temperature of `city` inside a `get-temp-by-city` span.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorOutcome::UpstreamFailure`] on transport failure, a
    /// non-200 status or an undecodable body.
    pub async fn resolve(&self, city: &str, parent: &Context) -> Result<f64, ErrorOutcome> {
        let scope = self
            .telemetry
            .start_span("get-temp-by-city", SpanKind::Client, parent);
        scope.set_attribute(KeyValue::new("city", city.to_string()));

        let result = async {
            let response = self
                .client
                .get(format!("{}/v1/current.json", self.base_url))
                .query(&[("key", self.api_key.as_str()), ("q", city)])
                .send()
                .await?;

            let status = response.status();
            scope.set_attribute(KeyValue::new(
                HTTP_RESPONSE_STATUS_CODE,
                i64::from(status.as_u16()),
            ));
            let body = response.bytes().await?;

            if status != StatusCode::OK {
                tracing::warn!(
                    %status,
                    body = %String::from_utf8_lossy(&body),
                    "Weather directory returned an error"
                );
                return Err(UpstreamError::Status(status).into());
            }

            self.decode(&body, scope.context())
        }
        .await;

        scope.finish(&result);
        result
    }

    fn decode(&self, body: &[u8], parent: &Context) -> Result<f64, ErrorOutcome> {
        let scope = self
            .telemetry
            .start_span("decode-weather-response", SpanKind::Internal, parent);

        let result = serde_json::from_slice::<WeatherApiResponse>(body)
            .map(|weather| weather.current.temp_c)
            .map_err(|err| ErrorOutcome::from(UpstreamError::Decode(err)));

        if let Ok(temp_c) = &result {
            scope.set_attribute(KeyValue::new("temp_c", *temp_c));
        }
        scope.finish(&result);
        result
    }
}

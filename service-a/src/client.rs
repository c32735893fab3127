//! Client for the back service's weather endpoint.

use axum::http::HeaderMap;
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use opentelemetry_semantic_conventions::trace::HTTP_RESPONSE_STATUS_CODE;
use shared::error::{ErrorOutcome, UpstreamError};
use shared::models::{PostalCode, TemperatureResult};
use shared::telemetry::{SpanScope, Telemetry};

/// Calls the back service, carrying the caller's trace context.
#[derive(Clone, Debug)]
pub struct WeatherClient {
    client: reqwest::Client,
    url: String,
    telemetry: Telemetry,
}

impl WeatherClient {
    /// Creates a client for the weather endpoint at `url`.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>, telemetry: Telemetry) -> Self {
        Self {
            client,
            url: url.into(),
            telemetry,
        }
    }

    /// Fetches the weather for `cep` inside a `call-downstream` span.
    ///
    /// The span's context is injected into the outbound headers, so the back
    /// service's spans join the same trace as children of this one.
    ///
    /// # Errors
    ///
    /// - [`ErrorOutcome::NotFound`] if the back service answers 404
    /// - [`ErrorOutcome::MalformedInput`] if it answers 422
    /// - [`ErrorOutcome::UpstreamFailure`] on any other status, transport
    ///   failure or undecodable body
    pub async fn fetch(
        &self,
        cep: &PostalCode,
        parent: &Context,
    ) -> Result<TemperatureResult, ErrorOutcome> {
        let scope = self
            .telemetry
            .start_span("call-downstream", SpanKind::Client, parent);
        scope.set_attribute(KeyValue::new("cep", cep.to_string()));

        let result = self.call(cep, &scope).await;

        if let Ok(weather) = &result {
            scope.set_attribute(KeyValue::new("city", weather.city.clone()));
        }
        scope.finish(&result);
        result
    }

    async fn call(
        &self,
        cep: &PostalCode,
        scope: &SpanScope,
    ) -> Result<TemperatureResult, ErrorOutcome> {
        let mut headers = HeaderMap::new();
        self.telemetry.inject(scope.context(), &mut headers);

        let response = self
            .client
            .get(&self.url)
            .headers(headers)
            .query(&[("cep", cep.as_str())])
            .send()
            .await?;

        let status = response.status();
        scope.set_attribute(KeyValue::new(
            HTTP_RESPONSE_STATUS_CODE,
            i64::from(status.as_u16()),
        ));
        ErrorOutcome::from_downstream_status(status)?;

        let body = response.bytes().await?;
        let weather = serde_json::from_slice(&body).map_err(UpstreamError::Decode)?;
        Ok(weather)
    }
}

//! Postal code to city lookup (ViaCEP).

use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use opentelemetry_semantic_conventions::trace::HTTP_RESPONSE_STATUS_CODE;
use serde::Deserialize;
use shared::error::{ErrorOutcome, UpstreamError};
use shared::models::PostalCode;
use shared::telemetry::Telemetry;

/// Body returned by the postal code directory.
#[derive(Debug, Deserialize)]
pub struct ViaCepResponse {
    /// City name. Empty when the code is unknown.
    #[serde(default)]
    pub localidade: String,

    /// Not-found marker; `true` or `"true"` depending on the API version.
    #[serde(default)]
    pub erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    /// Whether the directory reported the code as unknown.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        let flagged = match &self.erro {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => !flag.is_empty() && flag != "false",
            Some(_) => true,
        };
        flagged || self.localidade.is_empty()
    }
}

/// Resolves postal codes to city names.
#[derive(Clone, Debug)]
pub struct CityResolver {
    client: reqwest::Client,
    base_url: String,
    telemetry: Telemetry,
}

impl CityResolver {
    /// Creates a resolver querying `base_url`.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, telemetry: Telemetry) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            telemetry,
        }
    }

    /// Looks up the city for `cep` inside a `get-city-by-cep` span.
    ///
    /// # Errors
    ///
    /// - [`ErrorOutcome::NotFound`] if the directory does not know the code
    /// - [`ErrorOutcome::UpstreamFailure`] on transport or decode failure
    pub async fn resolve(&self, cep: &PostalCode, parent: &Context) -> Result<String, ErrorOutcome> {
        let scope = self
            .telemetry
            .start_span("get-city-by-cep", SpanKind::Client, parent);
        scope.set_attribute(KeyValue::new("cep", cep.to_string()));

        let result = async {
            let url = format!("{}/ws/{}/json/", self.base_url, cep);
            let response = self.client.get(url).send().await?;
            scope.set_attribute(KeyValue::new(
                HTTP_RESPONSE_STATUS_CODE,
                i64::from(response.status().as_u16()),
            ));
            let body = response.bytes().await?;
            self.decode(&body, scope.context())
        }
        .await;

        if let Ok(city) = &result {
            scope.set_attribute(KeyValue::new("city", city.clone()));
        }
        scope.finish(&result);
        result
    }

    fn decode(&self, body: &[u8], parent: &Context) -> Result<String, ErrorOutcome> {
        let scope = self
            .telemetry
            .start_span("decode-viacep-response", SpanKind::Internal, parent);

        let result = serde_json::from_slice::<ViaCepResponse>(body)
            .map_err(|err| ErrorOutcome::from(UpstreamError::Decode(err)))
            .and_then(|response| {
                if response.is_not_found() {
                    Err(ErrorOutcome::NotFound)
                } else {
                    Ok(response.localidade)
                }
            });

        scope.finish(&result);
        result
    }
}

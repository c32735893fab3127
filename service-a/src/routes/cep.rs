//! Postal code submission endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use opentelemetry_semantic_conventions::trace::HTTP_RESPONSE_STATUS_CODE;
use shared::error::{ErrorOutcome, MalformedInput};
use shared::models::{CepRequest, PostalCode, TemperatureResult};
use shared::telemetry::{SpanScope, Telemetry};

use crate::error::FrontError;
use crate::state::AppState;

/// Creates the postal code routes.
pub fn cep_routes() -> Router<AppState> {
    Router::new().route("/service-a", post(post_cep))
}

/// Handler for `POST /service-a`.
///
/// The body is taken raw so that any JSON problem, whatever the content type,
/// is answered with the same 400. A body that cannot be read at all, such as
/// one over the size limit, is answered the same way.
async fn post_cep(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TemperatureResult>, FrontError> {
    let parent = state.telemetry().extract(&headers);
    let scope = state
        .telemetry()
        .start_span("handle-cep", SpanKind::Server, &parent);
    tracing::info!(trace_id = %scope.trace_id(), "CEP request received");

    let body = body
        .inspect_err(|rejection| tracing::debug!(error = %rejection, "Unreadable request body"))
        .ok();
    let result = handle_cep(&state, body.as_deref(), &scope).await;

    let status = match &result {
        Ok(weather) => {
            tracing::info!(city = %weather.city, temp_c = weather.temp_c, "Weather relayed");
            StatusCode::OK
        }
        Err(err) => {
            tracing::warn!(kind = %err.kind(), error = %err, "CEP request failed");
            err.status_code()
        }
    };
    scope.set_attribute(KeyValue::new(
        HTTP_RESPONSE_STATUS_CODE,
        i64::from(status.as_u16()),
    ));
    scope.finish(&result);

    result.map(Json).map_err(FrontError::from)
}

async fn handle_cep(
    state: &AppState,
    body: Option<&[u8]>,
    scope: &SpanScope,
) -> Result<TemperatureResult, ErrorOutcome> {
    let cep = validate_cep(state.telemetry(), body, scope.context())?;
    scope.set_attribute(KeyValue::new("cep", cep.to_string()));

    let weather = state.weather().fetch(&cep, scope.context()).await?;
    scope.set_attribute(KeyValue::new("city", weather.city.clone()));

    Ok(weather)
}

/// Decodes and validates the body inside a `validate-cep` span.
///
/// `None` stands for a body that could not be read.
fn validate_cep(
    telemetry: &Telemetry,
    body: Option<&[u8]>,
    parent: &Context,
) -> Result<PostalCode, ErrorOutcome> {
    let scope = telemetry.start_span("validate-cep", SpanKind::Internal, parent);

    let result = body
        .ok_or(MalformedInput::InvalidRequest)
        .and_then(|body| {
            serde_json::from_slice::<CepRequest>(body).map_err(|_| MalformedInput::InvalidRequest)
        })
        .and_then(CepRequest::into_postal_code)
        .map_err(ErrorOutcome::from);

    if let Ok(cep) = &result {
        scope.set_attribute(KeyValue::new("cep", cep.to_string()));
    }
    scope.finish(&result);
    result
}

//! HTTP mapping of resolution failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::error::{ErrorBody, ErrorOutcome};

/// An [`ErrorOutcome`] as answered by the back service.
#[derive(Debug)]
pub struct BackError(pub ErrorOutcome);

impl BackError {
    /// Status code the back service answers `outcome` with.
    ///
    /// Any malformed input is reported as 422 here; the back service only
    /// ever sees a query parameter, never a body.
    #[must_use]
    pub fn status_for(outcome: &ErrorOutcome) -> StatusCode {
        match outcome {
            ErrorOutcome::MalformedInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            other => other.status_code(),
        }
    }

    /// Status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        Self::status_for(&self.0)
    }

    /// Client-facing message for this error.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match &self.0 {
            ErrorOutcome::MalformedInput(_) => "invalid zipcode",
            ErrorOutcome::NotFound => "can not find zipcode",
            ErrorOutcome::UpstreamFailure(_) => "internal error",
        }
    }
}

impl From<ErrorOutcome> for BackError {
    fn from(outcome: ErrorOutcome) -> Self {
        Self(outcome)
    }
}

impl IntoResponse for BackError {
    fn into_response(self) -> Response {
        ErrorBody::new(self.message()).into_response_with(self.status_code())
    }
}

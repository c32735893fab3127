//! HTTP mapping of request failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::error::{ErrorBody, ErrorOutcome};

/// An [`ErrorOutcome`] as answered by the front service.
///
/// Malformed input keeps its own status (400 for shape problems, 422 for a
/// bad code). Everything the back service could not deliver is reported with
/// one generic message.
#[derive(Debug)]
pub struct FrontError(pub ErrorOutcome);

impl FrontError {
    /// Status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.0.status_code()
    }

    /// Client-facing message for this error.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.0 {
            ErrorOutcome::MalformedInput(input) => input.to_string(),
            ErrorOutcome::NotFound => "can not find zipcode".to_string(),
            ErrorOutcome::UpstreamFailure(_) => "failed to get weather data".to_string(),
        }
    }
}

impl From<ErrorOutcome> for FrontError {
    fn from(outcome: ErrorOutcome) -> Self {
        Self(outcome)
    }
}

impl IntoResponse for FrontError {
    fn into_response(self) -> Response {
        ErrorBody::new(self.message()).into_response_with(self.status_code())
    }
}

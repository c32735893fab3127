//! Error taxonomy shared by both services.
//!
//! Every failure is classified once, where it happens, into an [`ErrorOutcome`].
//! Services map outcomes to HTTP statuses, and the front service maps the back
//! service's status codes back into outcomes. Messages are never inspected.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat classification of an [`ErrorOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Client-caused: bad syntax or shape.
    MalformedInput,
    /// Valid syntax, no matching resource.
    NotFound,
    /// A collaborator was unreachable, answered with a non-success status or
    /// returned an undecodable body.
    UpstreamFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput => write!(f, "malformed_input"),
            Self::NotFound => write!(f, "not_found"),
            Self::UpstreamFailure => write!(f, "upstream_failure"),
        }
    }
}

/// The ways client input can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MalformedInput {
    /// The request body is not a JSON object of the expected shape.
    #[error("invalid request")]
    InvalidRequest,

    /// The postal code field is missing or empty.
    #[error("cep is required")]
    CepRequired,

    /// The postal code is not exactly eight digits.
    #[error("invalid zipcode")]
    InvalidZipcode,
}

impl MalformedInput {
    /// HTTP status for this failure.
    ///
    /// Shape problems are 400; a present but syntactically wrong code is 422.
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::InvalidRequest | Self::CepRequired => StatusCode::BAD_REQUEST,
            Self::InvalidZipcode => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Failure talking to a collaborator.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collaborator answered with an unexpected status.
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// The collaborator's body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Tagged result of a failed resolution step.
#[derive(Debug, Error)]
pub enum ErrorOutcome {
    /// Client-caused failure.
    #[error(transparent)]
    MalformedInput(#[from] MalformedInput),

    /// The postal code is well formed but does not resolve to a city.
    #[error("can not find zipcode")]
    NotFound,

    /// A collaborator failed.
    #[error("upstream failure: {0}")]
    UpstreamFailure(#[from] UpstreamError),
}

impl ErrorOutcome {
    /// Returns the flat kind of this outcome.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::NotFound => ErrorKind::NotFound,
            Self::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
        }
    }

    /// HTTP status a service answers with for this outcome.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(input) => input.status_code(),
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classifies a downstream service's response status.
    ///
    /// This is the inverse of [`ErrorOutcome::status_code`] for the statuses
    /// the back service produces, so the taxonomy survives the HTTP hop.
    ///
    /// # Errors
    ///
    /// Returns the outcome for any status other than 200 OK.
    pub fn from_downstream_status(status: StatusCode) -> Result<(), Self> {
        match status {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(Self::NotFound),
            StatusCode::UNPROCESSABLE_ENTITY => {
                Err(Self::MalformedInput(MalformedInput::InvalidZipcode))
            }
            other => Err(Self::UpstreamFailure(UpstreamError::Status(other))),
        }
    }
}

impl From<reqwest::Error> for ErrorOutcome {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamFailure(UpstreamError::Transport(err))
    }
}

/// Error response body used by both services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Client-facing message.
    pub message: String,
}

impl ErrorBody {
    /// Creates an error body with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Pairs this body with a status code into a JSON response.
    #[must_use]
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

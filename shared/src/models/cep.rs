//! Postal code (CEP) data model.
//!
//! Defines the inbound request body and the validated `PostalCode` newtype.

use crate::error::MalformedInput;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Pattern a well-formed CEP must match: exactly eight ASCII digits.
///
/// `[0-9]` instead of `\d` so Unicode digits from other scripts are rejected.
pub static CEP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}$").expect("CEP pattern is a valid regex"));

/// Request body accepted by the front service.
///
/// # Example
///
/// ```
/// use shared::models::CepRequest;
///
/// let request: CepRequest = serde_json::from_str(r#"{"cep": "87043480"}"#).unwrap();
/// let cep = request.into_postal_code().unwrap();
///
/// assert_eq!(cep.as_str(), "87043480");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CepRequest {
    /// The raw postal code as submitted. Missing or `null` becomes empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cep: String,
}

impl CepRequest {
    /// Creates a request for the given raw postal code.
    #[must_use]
    pub fn new(cep: impl Into<String>) -> Self {
        Self { cep: cep.into() }
    }

    /// Validates the submitted code.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInput::CepRequired`] if the field is empty and
    /// [`MalformedInput::InvalidZipcode`] if it is not exactly eight digits.
    pub fn into_postal_code(self) -> Result<PostalCode, MalformedInput> {
        if self.cep.is_empty() {
            return Err(MalformedInput::CepRequired);
        }
        PostalCode::parse(self.cep)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A syntactically valid Brazilian postal code.
///
/// The only way to obtain one is [`PostalCode::parse`], so holding a
/// `PostalCode` means the eight-digit rule has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Validate)]
pub struct PostalCode {
    #[validate(regex(path = *CEP_PATTERN, message = "invalid zipcode"))]
    value: String,
}

impl PostalCode {
    /// Parses and validates a raw postal code.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInput::InvalidZipcode`] unless `raw` is exactly eight
    /// ASCII digits. An empty string is also `InvalidZipcode`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, MalformedInput> {
        let candidate = Self { value: raw.into() };
        candidate
            .validate()
            .map_err(|_| MalformedInput::InvalidZipcode)?;
        Ok(candidate)
    }

    /// Returns the postal code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for PostalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

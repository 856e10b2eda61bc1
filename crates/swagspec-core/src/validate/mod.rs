//! Response validation against a declared expectation
//!
//! Three checks run in order and the first failure wins: status code,
//! presence of declared headers, then body conformance. Body schemas are
//! merged with the document's shared schemas and tagged with the
//! nullable-aware dialect before they reach the [`SchemaValidator`].

pub mod extended;

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Dialect, Document, DocumentStore, StoreError};
use crate::metadata::{ExampleMetadata, JSON, ResponseExpectation};

pub use extended::{EXTENDED_SCHEMA_URI, ExtendedSchemaValidator, SchemaValidator};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Status, header or body did not match the expectation
    #[error("{0}")]
    UnexpectedResponse(String),
    /// Declared response content type has no body validator
    #[error("{0}")]
    UnexpectedContent(String),
    #[error("Invalid response schema: {0}")]
    InvalidSchema(String),
    #[error(transparent)]
    Document(#[from] StoreError),
}

impl ValidationError {
    /// Whether this is an expectation failure rather than a broken contract
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::UnexpectedResponse(_))
    }
}

/// Snapshot of HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ResponseSnapshot {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
}

impl ResponseSnapshot {
    #[must_use]
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Validates responses for examples against the documents in a store
#[derive(Debug, Clone)]
pub struct ResponseValidator<'a, S = ExtendedSchemaValidator> {
    store: &'a DocumentStore,
    validator: S,
}

impl<'a> ResponseValidator<'a> {
    #[must_use]
    pub fn new(store: &'a DocumentStore) -> Self {
        Self::with_validator(store, ExtendedSchemaValidator)
    }
}

impl<'a, S: SchemaValidator> ResponseValidator<'a, S> {
    #[must_use]
    pub fn with_validator(store: &'a DocumentStore, validator: S) -> Self {
        Self { store, validator }
    }

    /// Validate `response` against the example's expectation.
    ///
    /// # Errors
    ///
    /// See [`validate`]; additionally fails if the example's document is
    /// not in the store.
    pub fn validate(
        &self,
        example: &ExampleMetadata,
        response: &ResponseSnapshot,
    ) -> Result<(), ValidationError> {
        let document = self.store.get(example.document.as_deref())?;
        validate(&example.response, document, response, &self.validator)
    }
}

/// Check code, headers and body, stopping at the first violation.
///
/// # Errors
///
/// Returns [`ValidationError::UnexpectedResponse`] for a code mismatch, a
/// missing header or a schema violation, and
/// [`ValidationError::UnexpectedContent`] for a declared content type other
/// than JSON.
pub fn validate<S>(
    expectation: &ResponseExpectation,
    document: &Document,
    response: &ResponseSnapshot,
    validator: &S,
) -> Result<(), ValidationError>
where
    S: SchemaValidator + ?Sized,
{
    validate_code(expectation, response)?;
    validate_headers(expectation, response)?;
    validate_body(expectation, document, response, validator)
}

fn validate_code(
    expectation: &ResponseExpectation,
    response: &ResponseSnapshot,
) -> Result<(), ValidationError> {
    let actual = response.status_code.to_string();
    if actual == expectation.code {
        return Ok(());
    }
    Err(ValidationError::UnexpectedResponse(format!(
        "Expected response code '{actual}' to match '{}'",
        expectation.code
    )))
}

fn validate_headers(
    expectation: &ResponseExpectation,
    response: &ResponseSnapshot,
) -> Result<(), ValidationError> {
    for name in expectation.headers.keys() {
        if response.header(name).is_some_and(|v| !v.trim().is_empty()) {
            continue;
        }
        return Err(ValidationError::UnexpectedResponse(format!(
            "Expected response header {name} to be present"
        )));
    }
    Ok(())
}

fn validate_body<S>(
    expectation: &ResponseExpectation,
    document: &Document,
    response: &ResponseSnapshot,
    validator: &S,
) -> Result<(), ValidationError>
where
    S: SchemaValidator + ?Sized,
{
    match document.dialect() {
        Dialect::OpenApi3 => {
            let Some(content) = &expectation.content else {
                return Ok(());
            };
            for (mime, media) in content {
                if mime != JSON {
                    return Err(ValidationError::UnexpectedContent(format!(
                        "No validator for content with mime : {mime}"
                    )));
                }
                if let Some(schema) = &media.schema {
                    validate_json(&document.merge_shared_schemas(schema), response, validator)?;
                }
            }
            Ok(())
        }
        Dialect::Swagger2 => match &expectation.schema {
            Some(schema) => validate_json(&document.merge_shared_schemas(schema), response, validator),
            None => Ok(()),
        },
    }
}

fn validate_json<S>(
    schema: &Value,
    response: &ResponseSnapshot,
    validator: &S,
) -> Result<(), ValidationError>
where
    S: SchemaValidator + ?Sized,
{
    let mut schema = schema.clone();
    if let Value::Object(map) = &mut schema {
        map.insert("$schema".to_string(), Value::String(EXTENDED_SCHEMA_URI.to_string()));
    }

    let instance = match response.body.as_deref().map(str::trim) {
        None | Some("") => Value::Null,
        Some(text) => serde_json::from_str(text).map_err(|e| {
            ValidationError::UnexpectedResponse(format!(
                "Expected response body to match schema: body is not valid JSON ({e})"
            ))
        })?,
    };

    match validator.violations(&schema, &instance)?.into_iter().next() {
        Some(first) => Err(ValidationError::UnexpectedResponse(format!(
            "Expected response body to match schema: {first}"
        ))),
        None => Ok(()),
    }
}

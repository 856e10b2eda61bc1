//! Contract files: the on-disk form of declared examples
//!
//! A contract lists path items, their operations and the responses each
//! operation is expected to produce. Every response carries the `values`
//! that stand in for the test's named accessors. Request-body properties
//! are listed flatly and folded through the schema tree builder when the
//! file is expanded into [`ExampleMetadata`].
//!
//! ```yaml
//! document: v1/openapi.yaml
//! paths:
//!   /widgets/{id}:
//!     parameters:
//!       - { name: id, in: path, schema: { type: integer } }
//!     operations:
//!       - verb: get
//!         summary: Fetches a widget
//!         responses:
//!           - code: 200
//!             description: found
//!             values: { id: 1 }
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{StoreError, parse_document};
use crate::metadata::{
    BodyProperty, ExampleMetadata, OperationMetadata, ParameterEntry, PathItemMetadata,
    ResponseExpectation,
};
use crate::schema_tree::AttributeError;

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid contract {0}: {1}")]
    Invalid(PathBuf, String),
    #[error("Invalid body property in {0}: {1}")]
    Attribute(String, AttributeError),
}

/// One contract file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContractFile {
    /// Document key; absent selects the first configured document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Path template → path item
    #[serde(default)]
    pub paths: IndexMap<String, PathContract>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PathContract {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterEntry>,
    #[serde(default)]
    pub operations: Vec<OperationContract>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationContract {
    #[serde(flatten)]
    pub operation: OperationMetadata,
    /// Flat request-body properties; `address/street` declares nesting
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_properties: Vec<BodyProperty>,
    #[serde(default)]
    pub responses: Vec<ResponseContract>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResponseContract {
    #[serde(flatten)]
    pub expectation: ResponseExpectation,
    /// Named values the request is built from
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub values: Map<String, Value>,
}

/// A runnable example: metadata plus the values that feed it
#[derive(Debug, Clone, PartialEq)]
pub struct ContractExample {
    pub metadata: ExampleMetadata,
    pub values: Map<String, Value>,
}

impl ContractFile {
    /// Load a contract from JSON or YAML.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or does not have
    /// the contract shape.
    pub fn load(path: &Path) -> Result<Self, ContractError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Io(path.to_path_buf(), e.to_string()))?;
        let raw = parse_document(path, &content)?;
        serde_json::from_value(raw).map_err(|e| ContractError::Invalid(path.to_path_buf(), e.to_string()))
    }

    /// Expand into one example per declared response, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Attribute`] for a blank or malformed body
    /// property name.
    pub fn examples(&self) -> Result<Vec<ContractExample>, ContractError> {
        let mut examples = Vec::new();
        for (template, path) in &self.paths {
            let path_item = path
                .parameters
                .iter()
                .cloned()
                .fold(PathItemMetadata::new(template.clone()), |item, entry| item.parameter(entry));

            for op in &path.operations {
                let mut operation = op.operation.clone().normalized();
                for property in &op.body_properties {
                    operation = operation
                        .request_body_property(property.clone())
                        .map_err(|e| ContractError::Attribute(format!("{} {template}", op.operation.verb), e))?;
                }

                for response in &op.responses {
                    let mut metadata =
                        ExampleMetadata::new(path_item.clone(), operation.clone(), response.expectation.clone());
                    metadata.document.clone_from(&self.document);
                    examples.push(ContractExample {
                        metadata,
                        values: response.values.clone(),
                    });
                }
            }
        }
        Ok(examples)
    }
}

/// Load every contract and expand its examples, in the given order.
///
/// # Errors
///
/// Returns the first load or expansion error.
pub fn load_examples(paths: &[PathBuf]) -> Result<Vec<ContractExample>, ContractError> {
    let mut examples = Vec::new();
    for path in paths {
        let found = ContractFile::load(path)?.examples()?;
        tracing::debug!(contract = %path.display(), examples = found.len(), "loaded contract");
        examples.extend(found);
    }
    Ok(examples)
}

/// Generate JSON Schema for the contract file format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(ContractFile);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

//! Document assembly: fold example metadata back into the documents
//!
//! Each seed document is cloned once; examples are merged into the clone
//! under `paths[template][verb].responses[code]`. Seeds in the store are
//! never touched, so requests and validation keep reading the seeds.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::{Dialect, DocumentStore, StoreError, render_document};
use crate::metadata::{ExampleMetadata, JSON, ResponseExpectation};

/// Header attribute keys that belong under `schema` in OpenAPI 3
const HEADER_SCHEMA_KEYS: &[&str] = &["type", "format", "items", "enum", "default"];

pub struct DocumentAssembler<'a> {
    store: &'a DocumentStore,
    documents: IndexMap<String, Value>,
}

impl<'a> DocumentAssembler<'a> {
    #[must_use]
    pub fn new(store: &'a DocumentStore) -> Self {
        let documents = store
            .iter()
            .map(|(key, doc)| (key.to_string(), doc.raw().clone()))
            .collect();
        Self { store, documents }
    }

    /// Merge one example into its document.
    ///
    /// # Errors
    ///
    /// Returns error if the example names an unknown document or its
    /// metadata cannot be encoded.
    pub fn add(&mut self, example: &ExampleMetadata) -> Result<(), StoreError> {
        let dialect = self.store.get(example.document.as_deref())?.dialect();
        let key = self
            .store
            .resolve_key(example.document.as_deref())
            .ok_or(StoreError::Empty)?;
        let document = self
            .documents
            .get_mut(key)
            .ok_or_else(|| StoreError::UnknownDocument(key.to_string()))?;

        let paths = slot(object_mut(document), "paths");
        let path_item = slot(paths, &example.path_item.template);
        if !example.path_item.parameters.is_empty() {
            path_item.insert("parameters".to_string(), encode(&example.path_item.parameters)?);
        }

        let operation = slot(path_item, example.operation.verb.as_str());
        if let Value::Object(fields) = encode(&example.operation)? {
            for (name, value) in fields {
                if name != "verb" {
                    operation.insert(name, value);
                }
            }
        }

        let response = response_object(&example.response, dialect)?;
        slot(operation, "responses").insert(example.response.code.clone(), response);
        Ok(())
    }

    /// Merge every example, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`Self::add`].
    pub fn extend<'e, I>(&mut self, examples: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = &'e ExampleMetadata>,
    {
        for example in examples {
            self.add(example)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn document(&self, key: &str) -> Option<&Value> {
        self.documents.get(key)
    }

    #[must_use]
    pub fn documents(&self) -> &IndexMap<String, Value> {
        &self.documents
    }

    /// Write each document to `<output_dir>/<key>`, JSON or YAML by the
    /// key's extension.
    ///
    /// # Errors
    ///
    /// Returns error if a directory or file cannot be written.
    pub fn write_all(&self, output_dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let mut written = Vec::new();
        for (key, document) in &self.documents {
            let path = output_dir.join(key);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Write(parent.to_path_buf(), e.to_string()))?;
            }
            let content = render_document(&path, document)?;
            std::fs::write(&path, content).map_err(|e| StoreError::Write(path.clone(), e.to_string()))?;
            tracing::debug!(document = %key, path = %path.display(), "wrote document");
            written.push(path);
        }
        Ok(written)
    }
}

fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(fields) => fields,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// `map[key]` as an object, replacing any non-object value.
fn slot<'m>(map: &'m mut Map<String, Value>, key: &str) -> &'m mut Map<String, Value> {
    object_mut(map.entry(key.to_string()).or_insert(Value::Null))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Response entry as it appears in the document, without `code`.
///
/// OpenAPI 3 documents get the current shape: a legacy `schema` moves to
/// `content.application/json.schema` and header type attributes move under
/// each header's `schema`.
fn response_object(expectation: &ResponseExpectation, dialect: Dialect) -> Result<Value, StoreError> {
    let mut response = match encode(expectation)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    response.shift_remove("code");

    if dialect == Dialect::OpenApi3 {
        if let Some(schema) = response.shift_remove("schema") {
            let content = slot(&mut response, "content");
            content
                .entry(JSON.to_string())
                .or_insert_with(|| serde_json::json!({"schema": schema}));
        }
        if let Some(Value::Object(headers)) = response.get_mut("headers") {
            for attributes in headers.values_mut() {
                if let Value::Object(attributes) = attributes {
                    nest_header_schema(attributes);
                }
            }
        }
    }
    Ok(Value::Object(response))
}

fn nest_header_schema(attributes: &mut Map<String, Value>) {
    if attributes.contains_key("schema") {
        return;
    }
    let mut schema = Map::new();
    for key in HEADER_SCHEMA_KEYS {
        if let Some(value) = attributes.shift_remove(*key) {
            schema.insert((*key).to_string(), value);
        }
    }
    if !schema.is_empty() {
        attributes.insert("schema".to_string(), Value::Object(schema));
    }
}

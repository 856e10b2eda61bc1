//! API documents, their dialect, and the keyed store that holds them
//!
//! The core only ever reads documents. Everything that differs between
//! Swagger 2 and OpenAPI 3 (where security schemes live, what a shared
//! parameter reference looks like, which key holds shared schemas) is
//! answered by [`Dialect`] so callers never look up those keys themselves.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::metadata::ParameterDecl;

/// Maximum `$ref` hops followed when resolving a schema reference.
const MAX_REF_DEPTH: u32 = 20;

/// Which API-description version governs field shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Swagger2,
    OpenApi3,
}

impl Dialect {
    #[must_use]
    pub fn detect(raw: &Value) -> Self {
        if raw.get("openapi").is_some_and(|v| !v.is_null()) {
            Self::OpenApi3
        } else {
            Self::Swagger2
        }
    }

    /// Top-level key holding shared schemas, merged into response schemas
    /// before validation.
    #[must_use]
    pub const fn shared_schemas_key(self) -> &'static str {
        match self {
            Self::Swagger2 => "definitions",
            Self::OpenApi3 => "components",
        }
    }

    const fn parameter_ref_prefix(self) -> &'static str {
        match self {
            Self::Swagger2 => "#/parameters/",
            Self::OpenApi3 => "#/components/parameters/",
        }
    }

    /// Security scheme definitions of `raw`
    #[must_use]
    pub fn security_schemes(self, raw: &Value) -> Option<&Map<String, Value>> {
        match self {
            Self::Swagger2 => raw.get("securityDefinitions"),
            Self::OpenApi3 => raw.get("components").and_then(|c| c.get("securitySchemes")),
        }
        .and_then(Value::as_object)
    }

    /// Shared parameter definitions of `raw`
    #[must_use]
    pub fn shared_parameters(self, raw: &Value) -> Option<&Map<String, Value>> {
        match self {
            Self::Swagger2 => raw.get("parameters"),
            Self::OpenApi3 => raw.get("components").and_then(|c| c.get("parameters")),
        }
        .and_then(Value::as_object)
    }

    /// Declared value type of a parameter: `type` in Swagger 2,
    /// `schema.type` in OpenAPI 3.
    #[must_use]
    pub fn parameter_type(self, param: &ParameterDecl) -> Option<&str> {
        match self {
            Self::Swagger2 => param.param_type.as_deref(),
            Self::OpenApi3 => param
                .schema
                .as_ref()
                .and_then(|s| s.get("type"))
                .and_then(Value::as_str),
        }
    }
}

/// A parsed API document plus its detected dialect
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    raw: Value,
    dialect: Dialect,
}

impl Document {
    #[must_use]
    pub fn new(raw: Value) -> Self {
        let dialect = Dialect::detect(&raw);
        Self { raw, dialect }
    }

    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Prefix prepended to every path template.
    ///
    /// Swagger 2 uses `basePath`; OpenAPI 3 uses the path part of the first
    /// server URL. The transport appends request paths to the configured
    /// `base_url`, so that URL should stop at the host.
    #[must_use]
    pub fn base_path(&self) -> String {
        match self.dialect {
            Dialect::Swagger2 => self
                .raw
                .get("basePath")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            Dialect::OpenApi3 => self
                .raw
                .get("servers")
                .and_then(|s| s.get(0))
                .and_then(|s| s.get("url"))
                .and_then(Value::as_str)
                .map(server_path)
                .unwrap_or_default(),
        }
    }

    /// Document-wide security requirements
    #[must_use]
    pub fn security(&self) -> Option<&Vec<Value>> {
        self.raw.get("security").and_then(Value::as_array)
    }

    #[must_use]
    pub fn security_schemes(&self) -> Option<&Map<String, Value>> {
        self.dialect.security_schemes(&self.raw)
    }

    /// Look up a shared parameter by its `$ref`.
    ///
    /// Returns `None` when the reference does not use this dialect's prefix
    /// or names an undefined key.
    #[must_use]
    pub fn shared_parameter(&self, reference: &str) -> Option<&Value> {
        let key = reference.strip_prefix(self.dialect.parameter_ref_prefix())?;
        self.dialect.shared_parameters(&self.raw)?.get(key)
    }

    /// Document-level `produces` (Swagger 2 only)
    #[must_use]
    pub fn produces(&self) -> Option<Vec<String>> {
        string_list(self.raw.get("produces"))
    }

    /// Document-level `consumes` (Swagger 2 only)
    #[must_use]
    pub fn consumes(&self) -> Option<Vec<String>> {
        string_list(self.raw.get("consumes"))
    }

    /// `schema` with this document's shared schemas copied in at the top
    /// level, so local `$ref`s resolve within one self-contained value.
    #[must_use]
    pub fn merge_shared_schemas(&self, schema: &Value) -> Value {
        let key = self.dialect.shared_schemas_key();
        match (schema, self.raw.get(key)) {
            (Value::Object(map), Some(shared)) => {
                let mut merged = map.clone();
                merged.insert(key.to_string(), shared.clone());
                Value::Object(merged)
            }
            _ => schema.clone(),
        }
    }

    /// Follow a top-level `$ref` to a shared schema (`#/definitions/X` or
    /// `#/components/schemas/X`). Non-references are returned as-is.
    #[must_use]
    pub fn resolve_schema(&self, schema: &Value) -> Value {
        let mut current = schema.clone();
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                break;
            };
            match self.schema_at(reference) {
                Some(target) => current = target.clone(),
                None => break,
            }
        }
        current
    }

    fn schema_at(&self, reference: &str) -> Option<&Value> {
        let name = reference
            .strip_prefix("#/components/schemas/")
            .or_else(|| reference.strip_prefix("#/definitions/"))?;
        match self.dialect {
            Dialect::Swagger2 => self.raw.get("definitions")?.get(name),
            Dialect::OpenApi3 => self.raw.get("components")?.get("schemas")?.get(name),
        }
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

/// Path component of a server URL: `https://api.test/v1/` → `/v1`
pub(crate) fn server_path(url: &str) -> String {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |idx| &rest[idx..]),
        None => url,
    };
    path.trim_end_matches('/').to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unknown document '{0}'")]
    UnknownDocument(String),
    #[error("No documents configured")]
    Empty,
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error in {0}: {1}")]
    Parse(PathBuf, String),
    #[error("Cannot write {0}: {1}")]
    Write(PathBuf, String),
    #[error("Cannot encode metadata: {0}")]
    Encode(String),
}

/// Documents keyed by name, in configuration order
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: IndexMap<String, Document>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, key: impl Into<String>, document: Document) -> Self {
        self.insert(key, document);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, document: Document) {
        self.documents.insert(key.into(), document);
    }

    /// Load every configured seed document.
    ///
    /// # Errors
    ///
    /// Returns error if a file cannot be read or parsed.
    pub fn load(sources: &IndexMap<String, PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for (key, path) in sources {
            let content = std::fs::read_to_string(path)
                .map_err(|e| StoreError::Io(path.clone(), e.to_string()))?;
            let raw = parse_document(path, &content)?;
            tracing::debug!(document = %key, path = %path.display(), "loaded seed document");
            store.insert(key.clone(), Document::new(raw));
        }
        Ok(store)
    }

    /// Look up a document; `None` selects the first one.
    ///
    /// # Errors
    ///
    /// Returns error if the key is unknown or the store is empty.
    pub fn get(&self, key: Option<&str>) -> Result<&Document, StoreError> {
        match key {
            Some(key) => self
                .documents
                .get(key)
                .ok_or_else(|| StoreError::UnknownDocument(key.to_string())),
            None => self
                .documents
                .values()
                .next()
                .ok_or(StoreError::Empty),
        }
    }

    /// Key a lookup resolves to, applying the same default as [`Self::get`].
    #[must_use]
    pub fn resolve_key<'a>(&'a self, key: Option<&'a str>) -> Option<&'a str> {
        match key {
            Some(key) => self.documents.contains_key(key).then_some(key),
            None => self.documents.keys().next().map(String::as_str),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.documents.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn is_yaml(path: &Path) -> Option<bool> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "yaml" | "yml" => Some(true),
        "json" => Some(false),
        _ => None,
    }
}

/// Parse a document from JSON or YAML.
///
/// Detection strategy: extension first (`.yaml`/`.yml`/`.json`), then
/// content sniffing (leading `{` → JSON, otherwise YAML).
///
/// # Errors
///
/// Returns error if the content is not valid for the detected format.
pub fn parse_document(path: &Path, content: &str) -> Result<Value, StoreError> {
    let yaml = is_yaml(path).unwrap_or_else(|| !content.trim_start().starts_with('{'));
    if yaml {
        serde_yml::from_str(content)
            .map_err(|e| StoreError::Parse(path.to_path_buf(), format!("Invalid YAML: {e}")))
    } else {
        serde_json::from_str(content)
            .map_err(|e| StoreError::Parse(path.to_path_buf(), format!("Invalid JSON: {e}")))
    }
}

/// Render a document as YAML (`.yaml`/`.yml`) or pretty JSON (anything else).
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn render_document(path: &Path, document: &Value) -> Result<String, StoreError> {
    if is_yaml(path) == Some(true) {
        serde_yml::to_string(document).map_err(|e| StoreError::Write(path.to_path_buf(), e.to_string()))
    } else {
        serde_json::to_string_pretty(document)
            .map_err(|e| StoreError::Write(path.to_path_buf(), e.to_string()))
    }
}

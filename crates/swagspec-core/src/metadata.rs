//! Operation metadata declared by contract authors
//!
//! These types are the Rust form of what a test declares about one
//! operation: the path item it lives under, the operation itself and the
//! response it expects. The chained builder methods replace a DSL front-end;
//! everything here is plain data that the request builder and the response
//! validator read without mutating.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::schema_tree::{self, AttributeError};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM: &str = "multipart/form-data";
pub const JSON: &str = "application/json";
pub const XML: &str = "application/xml";

/// HTTP verb of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Verb {
    /// Lowercase form, as used for keys under a path item
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
        }
    }

    /// Uppercase HTTP method token
    #[must_use]
    pub const fn as_method(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_method())
    }
}

/// Where a parameter travels in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
    /// Swagger 2 single body parameter
    Body,
    /// Swagger 2 form field
    FormData,
}

/// Serialization convention for array-valued query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CollectionFormat {
    #[default]
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

/// A single parameter declaration.
///
/// `in` is absent for parameters synthesized from request-body properties.
/// `required` keeps the difference between "explicitly false" and "not said":
/// only explicit `false` lets the resolver drop an unprovided parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParamLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<CollectionFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Any other keys (`example`, `format`, `items`, vendor extensions...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParameterDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            location: Some(location),
            ..Self::default()
        }
        .normalized()
    }

    #[must_use]
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Path)
    }

    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Query)
    }

    #[must_use]
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Header)
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self.normalized()
    }

    #[must_use]
    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = Some(param_type.into());
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn collection_format(mut self, format: CollectionFormat) -> Self {
        self.collection_format = Some(format);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Path parameters are always required.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.location == Some(ParamLocation::Path) {
            self.required = Some(true);
        }
        self
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required == Some(true)
    }

    #[must_use]
    pub fn is_explicitly_optional(&self) -> bool {
        self.required == Some(false)
    }
}

/// A parameter list entry: either a reference into the document's shared
/// parameters or an inline declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ParameterEntry {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(ParameterDecl),
}

impl From<ParameterDecl> for ParameterEntry {
    fn from(decl: ParameterDecl) -> Self {
        Self::Inline(decl.normalized())
    }
}

impl ParameterEntry {
    #[must_use]
    pub fn reference(reference: impl Into<String>) -> Self {
        Self::Ref {
            reference: reference.into(),
        }
    }

    #[must_use]
    fn normalized(self) -> Self {
        match self {
            Self::Inline(decl) => Self::Inline(decl.normalized()),
            other => other,
        }
    }
}

/// Schema (and optional example) for one content type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl MediaType {
    #[must_use]
    pub fn with_schema(schema: Value) -> Self {
        Self {
            schema: Some(schema),
            example: None,
        }
    }
}

/// OpenAPI 3 request body: content type → media type, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A flat request-body property declaration.
///
/// `name` may be slash-delimited (`address/street`) to declare a nested
/// property. `required` and `example` inside `attributes` are folded into the
/// enclosing schema node rather than kept on the property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodyProperty {
    pub name: String,
    /// Content type this property belongs to (default: form-urlencoded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    /// Whether the request body as a whole is required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_required: Option<bool>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl BodyProperty {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn required(self) -> Self {
        self.attr("required", true)
    }

    #[must_use]
    pub fn example(self, example: impl Into<Value>) -> Self {
        self.attr("example", example)
    }
}

/// One security requirement: scheme name → scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Metadata of a single operation (verb on a path item)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    pub verb: Verb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
}

impl OperationMetadata {
    #[must_use]
    pub fn new(verb: Verb, summary: impl Into<String>) -> Self {
        Self {
            verb,
            summary: Some(summary.into()),
            description: None,
            operation_id: None,
            deprecated: None,
            tags: Vec::new(),
            security: None,
            consumes: None,
            produces: None,
            schemes: None,
            parameters: Vec::new(),
            request_body: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn security(mut self, requirements: Vec<SecurityRequirement>) -> Self {
        self.security = Some(requirements);
        self
    }

    #[must_use]
    pub fn consumes<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = Some(types.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn produces<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = Some(types.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn parameter(mut self, entry: impl Into<ParameterEntry>) -> Self {
        let entry: ParameterEntry = entry.into();
        self.parameters.push(entry.normalized());
        self
    }

    /// Fold one flat body property into the request-body schema for its
    /// content type.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError`] if the property name is blank or has an
    /// empty path segment.
    pub fn request_body_property(mut self, property: BodyProperty) -> Result<Self, AttributeError> {
        let BodyProperty {
            name,
            mime,
            body_required,
            attributes,
        } = property;
        let mime = mime.unwrap_or_else(|| FORM_URLENCODED.to_string());
        let body = self.request_body.get_or_insert_with(RequestBody::default);
        body.required = body_required.unwrap_or(false) || mime == FORM_URLENCODED;

        let media = body.content.entry(mime).or_default();
        media.schema = Some(schema_tree::fold(media.schema.take(), &name, attributes)?);
        Ok(self)
    }

    /// Declare the whole request-body schema for one content type.
    #[must_use]
    pub fn request_body_schema(mut self, mime: impl Into<String>, schema: Value) -> Self {
        let mime = mime.into();
        let body = self.request_body.get_or_insert_with(RequestBody::default);
        body.required = body.required || mime == FORM_URLENCODED;
        body.content.insert(mime, MediaType::with_schema(schema));
        self
    }

    /// Path parameters declared inline always come out required.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.parameters = self
            .parameters
            .into_iter()
            .map(ParameterEntry::normalized)
            .collect();
        self
    }
}

/// Metadata shared by every operation under one path template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PathItemMetadata {
    pub template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterEntry>,
}

impl PathItemMetadata {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn parameter(mut self, entry: impl Into<ParameterEntry>) -> Self {
        let entry: ParameterEntry = entry.into();
        self.parameters.push(entry.normalized());
        self
    }
}

/// Status code as written in contract files: `201` or `"201"`
#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum StatusCodeRepr {
    Text(String),
    Number(u16),
}

fn deserialize_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StatusCodeRepr::deserialize(deserializer)? {
        StatusCodeRepr::Text(code) => code,
        StatusCodeRepr::Number(code) => code.to_string(),
    })
}

/// What a response to the operation must look like
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResponseExpectation {
    #[serde(deserialize_with = "deserialize_code")]
    #[schemars(with = "StatusCodeRepr")]
    pub code: String,
    #[serde(default)]
    pub description: String,
    /// Header name → header attributes; only presence is checked
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Value>,
    /// Swagger 2 response schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// OpenAPI 3 response content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Value>,
}

impl ResponseExpectation {
    #[must_use]
    pub fn new(code: impl ToString, description: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            description: description.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, attributes: Value) -> Self {
        self.headers.insert(name.into(), attributes);
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn content(mut self, mime: impl Into<String>, schema: Value) -> Self {
        self.content
            .get_or_insert_with(IndexMap::new)
            .insert(mime.into(), MediaType::with_schema(schema));
        self
    }

    #[must_use]
    pub fn examples(mut self, examples: Value) -> Self {
        self.examples = Some(examples);
        self
    }

    /// Content types declared for this response, in declaration order
    #[must_use]
    pub fn content_types(&self) -> Vec<String> {
        self.content
            .as_ref()
            .map(|content| content.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Everything known about one example: the unit the core consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExampleMetadata {
    /// Document key in the store; `None` selects the first document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub path_item: PathItemMetadata,
    pub operation: OperationMetadata,
    pub response: ResponseExpectation,
}

impl ExampleMetadata {
    #[must_use]
    pub fn new(
        path_item: PathItemMetadata,
        operation: OperationMetadata,
        response: ResponseExpectation,
    ) -> Self {
        Self {
            document: None,
            path_item,
            operation,
            response,
        }
    }

    #[must_use]
    pub fn in_document(mut self, key: impl Into<String>) -> Self {
        self.document = Some(key.into());
        self
    }

    /// Label like `POST /widgets/{id}`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.operation.verb, self.path_item.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_parameter_is_forced_required() {
        let p = ParameterDecl::path("id").required(false);
        assert_eq!(p.required, Some(true));

        let q = ParameterDecl::query("page");
        assert_eq!(q.required, None);
        assert!(!q.is_explicitly_optional());
    }

    #[test]
    fn deserialized_path_parameter_is_normalized_by_builder() {
        let decl: ParameterDecl =
            serde_json::from_value(json!({"name": "id", "in": "path", "type": "integer"})).unwrap();
        assert_eq!(decl.required, None);

        let item = PathItemMetadata::new("/widgets/{id}").parameter(decl);
        match &item.parameters[0] {
            ParameterEntry::Inline(p) => assert_eq!(p.required, Some(true)),
            ParameterEntry::Ref { .. } => panic!("expected inline parameter"),
        }
    }

    #[test]
    fn parameter_entry_ref_and_inline() {
        let entries: Vec<ParameterEntry> = serde_json::from_value(json!([
            {"$ref": "#/parameters/page"},
            {"name": "q", "in": "query", "collectionFormat": "pipes", "x-extra": 1}
        ]))
        .unwrap();

        assert_eq!(entries[0], ParameterEntry::reference("#/parameters/page"));
        let ParameterEntry::Inline(q) = &entries[1] else {
            panic!("expected inline parameter");
        };
        assert_eq!(q.location, Some(ParamLocation::Query));
        assert_eq!(q.collection_format, Some(CollectionFormat::Pipes));
        assert_eq!(q.extra.get("x-extra"), Some(&json!(1)));
    }

    #[test]
    fn form_data_location_uses_camel_case() {
        let decl: ParameterDecl =
            serde_json::from_value(json!({"name": "file", "in": "formData"})).unwrap();
        assert_eq!(decl.location, Some(ParamLocation::FormData));
    }

    #[test]
    fn response_code_accepts_integer_or_string() {
        let a: ResponseExpectation = serde_json::from_value(json!({"code": 201})).unwrap();
        let b: ResponseExpectation = serde_json::from_value(json!({"code": "201"})).unwrap();
        assert_eq!(a.code, "201");
        assert_eq!(a, b);
    }

    #[test]
    fn request_body_property_defaults_to_form_and_required_body() {
        let op = OperationMetadata::new(Verb::Post, "Creates a widget")
            .request_body_property(BodyProperty::new("name").attr("type", "string").required())
            .unwrap();

        let body = op.request_body.unwrap();
        assert!(body.required);
        let schema = body.content[FORM_URLENCODED].schema.clone().unwrap();
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(schema["properties"]["name"], json!({"type": "string"}));
    }

    #[test]
    fn request_body_property_json_body_not_required_by_default() {
        let op = OperationMetadata::new(Verb::Post, "Creates a widget")
            .request_body_property(BodyProperty::new("name").mime(JSON).attr("type", "string"))
            .unwrap();
        assert!(!op.request_body.unwrap().required);
    }

    #[test]
    fn request_body_property_rejects_blank_name() {
        let result = OperationMetadata::new(Verb::Post, "Creates a widget")
            .request_body_property(BodyProperty::new("  "));
        assert_eq!(result.unwrap_err(), AttributeError::BlankName);
    }

    #[test]
    fn response_content_types_keep_declaration_order() {
        let r = ResponseExpectation::new(200, "ok")
            .content("application/xml", json!({}))
            .content(JSON, json!({}));
        assert_eq!(r.content_types(), vec!["application/xml", "application/json"]);
    }

    #[test]
    fn example_label() {
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/widgets/{id}"),
            OperationMetadata::new(Verb::Delete, "Deletes"),
            ResponseExpectation::new(204, "gone"),
        );
        assert_eq!(example.label(), "DELETE /widgets/{id}");
    }
}

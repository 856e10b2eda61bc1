//! Request construction from example metadata
//!
//! Given the resolved parameter list, [`build`] interpolates the path,
//! appends the query string, derives content-negotiation and declared
//! headers, and serializes the payload selected by the final
//! `Content-Type`. Nothing here performs I/O.

pub mod query;
pub mod xml;

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Dialect, Document, DocumentStore, StoreError};
use crate::metadata::{
    ExampleMetadata, FORM_URLENCODED, JSON, MULTIPART_FORM, ParamLocation, ParameterDecl, Verb, XML,
};
use crate::params;
use crate::values::{MissingValue, ValueSource, param_string};

const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";
const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Referenced parameter '{0}' must be defined")]
    UndefinedParameter(String),
    #[error("Invalid parameter definition '{0}': {1}")]
    InvalidParameter(String, String),
    #[error(transparent)]
    MissingValue(#[from] MissingValue),
    #[error("Cannot encode {0} payload: {1}")]
    Encode(&'static str, String),
    #[error(transparent)]
    Document(#[from] StoreError),
}

/// Header-name convention the transport expects for the well-known headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HeaderCasing {
    /// `Accept`, `Content-Type`, `Authorization`
    #[default]
    Canonical,
    /// `HTTP_ACCEPT`, `CONTENT_TYPE`, `HTTP_AUTHORIZATION`
    Rack,
}

impl HeaderCasing {
    /// Translate a header name; anything but the three well-known headers
    /// passes through unchanged.
    #[must_use]
    pub fn apply(self, name: &str) -> &str {
        match (self, name) {
            (Self::Rack, ACCEPT) => "HTTP_ACCEPT",
            (Self::Rack, CONTENT_TYPE) => "CONTENT_TYPE",
            (Self::Rack, AUTHORIZATION) => "HTTP_AUTHORIZATION",
            _ => name,
        }
    }

    /// Canonical name for a translated header name
    #[must_use]
    pub fn canonical(self, name: &str) -> &str {
        match (self, name) {
            (Self::Rack, "HTTP_ACCEPT") => ACCEPT,
            (Self::Rack, "CONTENT_TYPE") => CONTENT_TYPE,
            (Self::Rack, "HTTP_AUTHORIZATION") => AUTHORIZATION,
            _ => name,
        }
    }
}

/// Serialized request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Payload {
    /// Field map; the transport picks urlencoded or multipart encoding
    Form(Map<String, Value>),
    Json(String),
    Xml(String),
}

impl Payload {
    /// Body as text, with form fields joined `name=value&...`
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Form(fields) => fields
                .iter()
                .map(|(k, v)| format!("{k}={}", param_string(v)))
                .collect::<Vec<_>>()
                .join("&"),
            Self::Json(text) | Self::Xml(text) => text.clone(),
        }
    }
}

/// A request ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRequest {
    pub verb: Verb,
    /// Base path + interpolated template + query string
    pub path: String,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(skip)]
    pub casing: HeaderCasing,
}

impl ResolvedRequest {
    /// Look up a header by its canonical name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(self.casing.apply(name)).map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// Headers under their canonical names
    pub fn canonical_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(k, v)| (self.casing.canonical(k), v.as_str()))
    }
}

/// Builds requests for examples against the documents in a store
#[derive(Debug, Clone, Copy)]
pub struct RequestFactory<'a> {
    store: &'a DocumentStore,
    casing: HeaderCasing,
}

impl<'a> RequestFactory<'a> {
    #[must_use]
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            casing: HeaderCasing::default(),
        }
    }

    #[must_use]
    pub fn with_casing(mut self, casing: HeaderCasing) -> Self {
        self.casing = casing;
        self
    }

    /// Resolve parameters and build the request for one example.
    ///
    /// # Errors
    ///
    /// Returns error if the example's document is unknown, a shared
    /// parameter reference is undefined, a required value is missing, or
    /// the payload cannot be encoded.
    pub fn build_request<V>(
        &self,
        example: &ExampleMetadata,
        values: &V,
    ) -> Result<ResolvedRequest, RequestError>
    where
        V: ValueSource + ?Sized,
    {
        let document = self.store.get(example.document.as_deref())?;
        let parameters = params::resolve(example, document, values)?;
        build(example, document, &parameters, values, self.casing)
    }
}

/// Assemble verb, path, headers and payload from resolved parameters.
///
/// # Errors
///
/// Returns [`RequestError::MissingValue`] when a path parameter or required
/// body field has no value, and [`RequestError::Encode`] when the payload
/// cannot be serialized.
pub fn build<V>(
    example: &ExampleMetadata,
    document: &Document,
    parameters: &[ParameterDecl],
    values: &V,
    casing: HeaderCasing,
) -> Result<ResolvedRequest, RequestError>
where
    V: ValueSource + ?Sized,
{
    let path = build_path(example, document, parameters, values)?;
    let tuples = header_tuples(example, document, parameters, values);

    let content_type = tuples
        .iter()
        .rev()
        .find(|(name, _)| name == CONTENT_TYPE)
        .map(|(_, value)| value.clone());
    let payload = match content_type {
        Some(content_type) => build_payload(example, document, parameters, values, &content_type)?,
        None => None,
    };

    let headers = tuples
        .into_iter()
        .map(|(name, value)| (casing.apply(&name).to_string(), value))
        .collect();

    Ok(ResolvedRequest {
        verb: example.operation.verb,
        path,
        headers,
        payload,
        casing,
    })
}

fn located<'p>(
    parameters: &'p [ParameterDecl],
    location: ParamLocation,
) -> impl Iterator<Item = &'p ParameterDecl> {
    parameters
        .iter()
        .filter(move |p| p.location == Some(location))
}

fn build_path<V>(
    example: &ExampleMetadata,
    document: &Document,
    parameters: &[ParameterDecl],
    values: &V,
) -> Result<String, RequestError>
where
    V: ValueSource + ?Sized,
{
    let mut path = document.base_path() + &example.path_item.template;
    for param in located(parameters, ParamLocation::Path) {
        let value = values.get(&param.name)?;
        path = path.replace(&format!("{{{}}}", param.name), &param_string(&value));
    }

    let dialect = document.dialect();
    let parts: Vec<String> = located(parameters, ParamLocation::Query)
        .filter_map(|param| {
            let value = values.try_get(&param.name).filter(|v| !v.is_null())?;
            let array_typed = dialect.parameter_type(param) == Some("array");
            let format = param.collection_format.unwrap_or_default();
            Some(query::query_part(&param.name, &value, array_typed, format))
        })
        .collect();
    if !parts.is_empty() {
        path.push('?');
        path.push_str(&parts.join("&"));
    }
    Ok(path)
}

/// Declared header values plus `Accept` / `Content-Type`, canonical names.
fn header_tuples<V>(
    example: &ExampleMetadata,
    document: &Document,
    parameters: &[ParameterDecl],
    values: &V,
) -> Vec<(String, String)>
where
    V: ValueSource + ?Sized,
{
    let mut tuples: Vec<(String, String)> = located(parameters, ParamLocation::Header)
        .filter_map(|param| {
            let value = values.try_get(&param.name)?;
            Some((param.name.clone(), param_string(&value)))
        })
        .collect();

    let (produces, consumes) = match document.dialect() {
        Dialect::OpenApi3 => (
            example.response.content_types(),
            example
                .operation
                .request_body
                .as_ref()
                .map(|body| body.content.keys().cloned().collect())
                .unwrap_or_default(),
        ),
        Dialect::Swagger2 => (
            example
                .operation
                .produces
                .clone()
                .or_else(|| document.produces())
                .unwrap_or_default(),
            example
                .operation
                .consumes
                .clone()
                .or_else(|| document.consumes())
                .unwrap_or_default(),
        ),
    };

    for (name, declared) in [(ACCEPT, produces), (CONTENT_TYPE, consumes)] {
        let chosen = values
            .try_get(name)
            .map(|v| param_string(&v))
            .or_else(|| declared.into_iter().next());
        if let Some(value) = chosen {
            tuples.push((name.to_string(), value));
        }
    }
    tuples
}

fn build_payload<V>(
    example: &ExampleMetadata,
    document: &Document,
    parameters: &[ParameterDecl],
    values: &V,
    content_type: &str,
) -> Result<Option<Payload>, RequestError>
where
    V: ValueSource + ?Sized,
{
    let essence = content_type.split(';').next().unwrap_or("").trim();
    let payload = match essence {
        FORM_URLENCODED | MULTIPART_FORM => {
            form_fields(example, document, parameters, values, essence)?.map(Payload::Form)
        }
        JSON => match document.dialect() {
            Dialect::OpenApi3 => form_fields(example, document, parameters, values, essence)?
                .map(|fields| to_json(&Value::Object(fields)))
                .transpose()?
                .map(Payload::Json),
            Dialect::Swagger2 => located(parameters, ParamLocation::Body)
                .next()
                .map(|param| lookup(values, param))
                .transpose()?
                .flatten()
                .map(|value| to_json(&value))
                .transpose()?
                .map(Payload::Json),
        },
        XML => form_fields(example, document, parameters, values, essence)?
            .map(|fields| xml::encode(xml::root_name(&example.path_item.template), &fields))
            .transpose()?
            .map(Payload::Xml),
        _ => None,
    };
    Ok(payload)
}

/// Field map for form-shaped payloads.
///
/// OpenAPI 3 reads the request-body schema declared for `content_type`
/// (none declared → no payload); Swagger 2 reads `formData` parameters.
fn form_fields<V>(
    example: &ExampleMetadata,
    document: &Document,
    parameters: &[ParameterDecl],
    values: &V,
    content_type: &str,
) -> Result<Option<Map<String, Value>>, RequestError>
where
    V: ValueSource + ?Sized,
{
    let mut fields = Map::new();
    match document.dialect() {
        Dialect::OpenApi3 => {
            let Some(schema) = example
                .operation
                .request_body
                .as_ref()
                .and_then(|body| body.content.get(content_type))
                .and_then(|media| media.schema.as_ref())
            else {
                return Ok(None);
            };
            let schema = document.resolve_schema(schema);
            let required = |name: &str| {
                schema
                    .get("required")
                    .and_then(Value::as_array)
                    .is_some_and(|names| names.iter().any(|n| n.as_str() == Some(name)))
            };
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for name in properties.keys() {
                    let value = if required(name) {
                        Some(values.get(name)?)
                    } else {
                        values.try_get(name)
                    };
                    if let Some(value) = value {
                        fields.insert(name.clone(), value);
                    }
                }
            }
        }
        Dialect::Swagger2 => {
            for param in located(parameters, ParamLocation::FormData) {
                if let Some(value) = lookup(values, param)? {
                    fields.insert(param.name.clone(), value);
                }
            }
        }
    }
    Ok(Some(fields))
}

/// Required parameters must have a value; optional ones may be absent.
fn lookup<V>(values: &V, param: &ParameterDecl) -> Result<Option<Value>, RequestError>
where
    V: ValueSource + ?Sized,
{
    if param.is_required() {
        Ok(Some(values.get(&param.name)?))
    } else {
        Ok(values.try_get(&param.name))
    }
}

fn to_json(value: &Value) -> Result<String, RequestError> {
    serde_json::to_string(value).map_err(|e| RequestError::Encode("JSON", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        BodyProperty, CollectionFormat, OperationMetadata, ParameterEntry, PathItemMetadata,
        ResponseExpectation, SecurityRequirement,
    };
    use indexmap::IndexMap;
    use serde_json::json;

    fn swagger() -> Document {
        Document::new(json!({
            "swagger": "2.0",
            "basePath": "/api",
            "produces": ["application/json"],
            "securityDefinitions": {
                "api_key": {"type": "apiKey", "name": "api_key", "in": "query"},
                "bearer": {"type": "oauth2"}
            }
        }))
    }

    fn openapi() -> Document {
        Document::new(json!({
            "openapi": "3.0.1",
            "servers": [{"url": "https://api.example.com/v2"}],
            "components": {
                "schemas": {
                    "NewWidget": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}, "size": {"type": "integer"}},
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    fn values(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("values must be an object"),
        }
    }

    fn requirement(name: &str) -> SecurityRequirement {
        let mut req = IndexMap::new();
        req.insert(name.to_string(), Vec::new());
        req
    }

    fn run(
        example: &ExampleMetadata,
        document: &Document,
        values: &Map<String, Value>,
        casing: HeaderCasing,
    ) -> Result<ResolvedRequest, RequestError> {
        let parameters = params::resolve(example, document, values)?;
        build(example, document, &parameters, values, casing)
    }

    fn get_widgets(operation: OperationMetadata) -> ExampleMetadata {
        ExampleMetadata::new(
            PathItemMetadata::new("/widgets"),
            operation,
            ResponseExpectation::new(200, "ok"),
        )
    }

    #[test]
    fn interpolates_path_with_base_path() {
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/shops/{shop_id}/widgets/{id}")
                .parameter(ParameterDecl::path("shop_id")),
            OperationMetadata::new(Verb::Get, "Fetch").parameter(ParameterDecl::path("id")),
            ResponseExpectation::new(200, "ok"),
        );
        let request = run(
            &example,
            &swagger(),
            &values(json!({"shop_id": "s1", "id": 7})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        assert_eq!(request.verb, Verb::Get);
        assert_eq!(request.path, "/api/shops/s1/widgets/7");
    }

    #[test]
    fn missing_path_value_propagates() {
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/widgets/{id}").parameter(ParameterDecl::path("id")),
            OperationMetadata::new(Verb::Get, "Fetch"),
            ResponseExpectation::new(200, "ok"),
        );
        let err = run(&example, &swagger(), &Map::new(), HeaderCasing::Canonical).unwrap_err();
        assert!(matches!(err, RequestError::MissingValue(MissingValue(name)) if name == "id"));
    }

    #[test]
    fn query_string_skips_absent_values() {
        let example = get_widgets(
            OperationMetadata::new(Verb::Get, "List")
                .parameter(ParameterDecl::query("page").with_type("integer"))
                .parameter(ParameterDecl::query("sort"))
                .parameter(
                    ParameterDecl::query("tags")
                        .with_type("array")
                        .collection_format(CollectionFormat::Pipes),
                ),
        );
        let request = run(
            &example,
            &swagger(),
            &values(json!({"page": 2, "tags": ["a", "b"]})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        assert_eq!(request.path, "/api/widgets?page=2&tags=a|b");
    }

    #[test]
    fn openapi_array_type_comes_from_schema() {
        let example = get_widgets(
            OperationMetadata::new(Verb::Get, "List").parameter(
                ParameterDecl::query("ids")
                    .with_schema(json!({"type": "array", "items": {"type": "integer"}}))
                    .collection_format(CollectionFormat::Multi),
            ),
        );
        let request = run(
            &example,
            &openapi(),
            &values(json!({"ids": [1, 2]})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        assert_eq!(request.path, "/v2/widgets?ids=1&ids=2");
    }

    #[test]
    fn api_key_security_goes_to_query() {
        let example =
            get_widgets(OperationMetadata::new(Verb::Get, "List").security(vec![requirement("api_key")]));
        let request = run(
            &example,
            &swagger(),
            &values(json!({"api_key": "secret"})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        assert_eq!(request.path, "/api/widgets?api_key=secret");
    }

    #[test]
    fn headers_accept_and_rack_casing() {
        let example = get_widgets(
            OperationMetadata::new(Verb::Get, "List")
                .parameter(ParameterDecl::header("X-Trace"))
                .parameter(ParameterDecl::header("X-Missing"))
                .security(vec![requirement("bearer")]),
        );
        let request = run(
            &example,
            &swagger(),
            &values(json!({"X-Trace": "abc", "Authorization": "Bearer t"})),
            HeaderCasing::Rack,
        )
        .unwrap();

        assert_eq!(request.headers.get("X-Trace").map(String::as_str), Some("abc"));
        assert_eq!(
            request.headers.get("HTTP_AUTHORIZATION").map(String::as_str),
            Some("Bearer t")
        );
        assert_eq!(
            request.headers.get("HTTP_ACCEPT").map(String::as_str),
            Some("application/json")
        );
        assert!(!request.headers.contains_key("X-Missing"));
        assert!(!request.headers.contains_key("CONTENT_TYPE"));
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert!(request.payload.is_none());
    }

    #[test]
    fn accept_override_wins() {
        let example = get_widgets(OperationMetadata::new(Verb::Get, "List").produces(["application/json"]));
        let request = run(
            &example,
            &swagger(),
            &values(json!({"Accept": "application/xml"})),
            HeaderCasing::Canonical,
        )
        .unwrap();
        assert_eq!(request.header("Accept"), Some("application/xml"));
    }

    #[test]
    fn openapi_accept_from_response_content() {
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/widgets"),
            OperationMetadata::new(Verb::Get, "List"),
            ResponseExpectation::new(200, "ok")
                .content("application/vnd.widgets+json", json!({}))
                .content(JSON, json!({})),
        );
        let request = run(&example, &openapi(), &Map::new(), HeaderCasing::Canonical).unwrap();
        assert_eq!(request.header("Accept"), Some("application/vnd.widgets+json"));
    }

    #[test]
    fn openapi_form_payload_from_body_properties() {
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/widgets"),
            OperationMetadata::new(Verb::Post, "Create")
                .request_body_property(BodyProperty::new("name").attr("type", "string").required())
                .unwrap()
                .request_body_property(BodyProperty::new("color").attr("type", "string"))
                .unwrap(),
            ResponseExpectation::new(201, "created"),
        );
        let request = run(
            &example,
            &openapi(),
            &values(json!({"name": "bolt"})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        assert_eq!(request.content_type(), Some(FORM_URLENCODED));
        assert_eq!(request.payload, Some(Payload::Form(values(json!({"name": "bolt"})))));
    }

    #[test]
    fn openapi_json_payload_from_referenced_schema() {
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/widgets"),
            OperationMetadata::new(Verb::Post, "Create")
                .request_body_schema(JSON, json!({"$ref": "#/components/schemas/NewWidget"})),
            ResponseExpectation::new(201, "created"),
        );
        let request = run(
            &example,
            &openapi(),
            &values(json!({"name": "bolt", "size": 3, "extra": true})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        assert_eq!(
            request.payload,
            Some(Payload::Json(r#"{"name":"bolt","size":3}"#.to_string()))
        );
    }

    #[test]
    fn openapi_required_body_field_must_have_value() {
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/widgets"),
            OperationMetadata::new(Verb::Post, "Create")
                .request_body_schema(JSON, json!({"$ref": "#/components/schemas/NewWidget"})),
            ResponseExpectation::new(201, "created"),
        );
        let err = run(
            &example,
            &openapi(),
            &values(json!({"size": 3})),
            HeaderCasing::Canonical,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::MissingValue(_)));
    }

    #[test]
    fn swagger_json_payload_from_body_parameter() {
        let body = ParameterDecl::new("widget", ParamLocation::Body)
            .required(true)
            .with_schema(json!({"type": "object"}));
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/widgets"),
            OperationMetadata::new(Verb::Post, "Create")
                .consumes([JSON])
                .parameter(body),
            ResponseExpectation::new(201, "created"),
        );
        let request = run(
            &example,
            &swagger(),
            &values(json!({"widget": {"name": "bolt"}})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        assert_eq!(
            request.payload,
            Some(Payload::Json(r#"{"name":"bolt"}"#.to_string()))
        );
    }

    #[test]
    fn swagger_json_without_body_parameter_has_no_payload() {
        let example = get_widgets(OperationMetadata::new(Verb::Post, "Create").consumes([JSON]));
        let request = run(&example, &swagger(), &Map::new(), HeaderCasing::Canonical).unwrap();
        assert_eq!(request.content_type(), Some(JSON));
        assert!(request.payload.is_none());
    }

    #[test]
    fn swagger_form_payload_from_form_data() {
        let example = get_widgets(
            OperationMetadata::new(Verb::Post, "Upload")
                .consumes([MULTIPART_FORM])
                .parameter(ParameterDecl::new("file", ParamLocation::FormData).required(true))
                .parameter(ParameterDecl::new("note", ParamLocation::FormData)),
        );
        let request = run(
            &example,
            &swagger(),
            &values(json!({"file": "data"})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        assert_eq!(request.payload, Some(Payload::Form(values(json!({"file": "data"})))));
    }

    #[test]
    fn xml_payload_uses_template_root() {
        let example = get_widgets(
            OperationMetadata::new(Verb::Post, "Create")
                .consumes([XML])
                .parameter(ParameterDecl::new("name", ParamLocation::FormData)),
        );
        let request = run(
            &example,
            &swagger(),
            &values(json!({"name": "bolt"})),
            HeaderCasing::Canonical,
        )
        .unwrap();

        let Some(Payload::Xml(xml)) = request.payload else {
            panic!("expected XML payload");
        };
        assert!(xml.contains("<widgets>"));
        assert!(xml.contains("<name>bolt</name>"));
    }

    #[test]
    fn unknown_content_type_has_no_payload() {
        let example = get_widgets(OperationMetadata::new(Verb::Post, "Create").consumes(["text/plain"]));
        let request = run(&example, &swagger(), &Map::new(), HeaderCasing::Canonical).unwrap();
        assert!(request.payload.is_none());
    }

    #[test]
    fn building_twice_is_identical() {
        let example = ExampleMetadata::new(
            PathItemMetadata::new("/widgets/{id}").parameter(ParameterDecl::path("id")),
            OperationMetadata::new(Verb::Put, "Update")
                .parameter(ParameterDecl::header("X-B"))
                .parameter(ParameterDecl::header("X-A"))
                .request_body_schema(JSON, json!({"$ref": "#/components/schemas/NewWidget"})),
            ResponseExpectation::new(200, "ok").content(JSON, json!({})),
        );
        let vals = values(json!({"id": 1, "X-A": "a", "X-B": "b", "name": "bolt"}));

        let first = run(&example, &openapi(), &vals, HeaderCasing::Rack).unwrap();
        let second = run(&example, &openapi(), &vals, HeaderCasing::Rack).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn factory_reports_unknown_document() {
        let store = DocumentStore::new().with_document("v1/swagger.json", swagger());
        let example = get_widgets(OperationMetadata::new(Verb::Get, "List")).in_document("v9.json");

        let err = RequestFactory::new(&store)
            .build_request(&example, &Map::new())
            .unwrap_err();
        assert!(matches!(err, RequestError::Document(StoreError::UnknownDocument(_))));
    }

    #[test]
    fn factory_resolves_shared_references() {
        let store = DocumentStore::new().with_document(
            "v1/swagger.json",
            Document::new(json!({
                "swagger": "2.0",
                "parameters": {"page": {"name": "page", "in": "query", "type": "integer"}}
            })),
        );
        let example = get_widgets(
            OperationMetadata::new(Verb::Get, "List")
                .parameter(ParameterEntry::reference("#/parameters/page")),
        );
        let request = RequestFactory::new(&store)
            .build_request(&example, &values(json!({"page": 3})))
            .unwrap();
        assert_eq!(request.path, "/widgets?page=3");
    }

    #[test]
    fn payload_text_forms() {
        let form = Payload::Form(values(json!({"a": 1, "b": "x"})));
        assert_eq!(form.to_text(), "a=1&b=x");
        assert_eq!(Payload::Json("{}".into()).to_text(), "{}");
    }
}

//! Parameter resolution: gather, dereference, dedupe and filter
//!
//! Order matters. Operation parameters come first, then names synthesized
//! from the request-body schema, then path-item parameters, then whatever
//! the security requirements imply. Deduplication keeps the first entry per
//! name, so an operation-level declaration shadows a path-item one.

use std::collections::HashSet;

use serde_json::Value;

use crate::document::Document;
use crate::metadata::{ExampleMetadata, ParamLocation, ParameterDecl, ParameterEntry};
use crate::request::RequestError;
use crate::values::ValueSource;

/// Resolve the effective parameter list for one example.
///
/// # Errors
///
/// Returns [`RequestError::UndefinedParameter`] when a `$ref` names a shared
/// parameter the document does not define, and
/// [`RequestError::InvalidParameter`] when a shared or security-derived
/// definition cannot be read as a parameter.
pub fn resolve<V>(
    example: &ExampleMetadata,
    document: &Document,
    values: &V,
) -> Result<Vec<ParameterDecl>, RequestError>
where
    V: ValueSource + ?Sized,
{
    let collected = example
        .operation
        .parameters
        .iter()
        .cloned()
        .chain(request_body_parameters(example, document).map(ParameterEntry::Inline))
        .chain(example.path_item.parameters.iter().cloned())
        .chain(security_parameters(example, document)?.into_iter().map(ParameterEntry::Inline));

    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    for entry in collected {
        let param = dereference(entry, document)?;
        if seen.insert(param.name.clone()) {
            resolved.push(param);
        }
    }

    resolved.retain(|p| !(p.is_explicitly_optional() && !values.contains(&p.name)));
    Ok(resolved)
}

fn dereference(entry: ParameterEntry, document: &Document) -> Result<ParameterDecl, RequestError> {
    match entry {
        ParameterEntry::Inline(decl) => Ok(decl),
        ParameterEntry::Ref { reference } => {
            let shared = document
                .shared_parameter(&reference)
                .ok_or_else(|| RequestError::UndefinedParameter(reference.clone()))?;
            let decl: ParameterDecl = serde_json::from_value(shared.clone())
                .map_err(|e| RequestError::InvalidParameter(reference, e.to_string()))?;
            Ok(decl.normalized())
        }
    }
}

/// One name per request-body property, across every declared content type.
/// `required` mirrors the body schema's `required` list.
fn request_body_parameters<'a>(
    example: &'a ExampleMetadata,
    document: &'a Document,
) -> impl Iterator<Item = ParameterDecl> + 'a {
    example
        .operation
        .request_body
        .iter()
        .flat_map(|body| body.content.values())
        .filter_map(|media| media.schema.as_ref())
        .flat_map(move |schema| {
            let schema = document.resolve_schema(schema);
            let required: Vec<String> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default();
            schema
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
                .into_iter()
                .map(move |name| ParameterDecl {
                    required: Some(required.contains(&name)),
                    name,
                    ..ParameterDecl::default()
                })
        })
}

/// Parameters implied by security requirements.
///
/// Operation requirements win over document requirements. An `apiKey`
/// scheme travels under its own name and location; any other scheme type
/// becomes an `Authorization` header. All are required only when exactly
/// one requirement is declared.
fn security_parameters(
    example: &ExampleMetadata,
    document: &Document,
) -> Result<Vec<ParameterDecl>, RequestError> {
    let requirements: Vec<Vec<String>> = match &example.operation.security {
        Some(reqs) => reqs.iter().map(|r| r.keys().cloned().collect()).collect(),
        None => document
            .security()
            .map(|reqs| {
                reqs.iter()
                    .map(|r| {
                        r.as_object()
                            .map(|o| o.keys().cloned().collect())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default(),
    };
    let Some(schemes) = document.security_schemes() else {
        return Ok(Vec::new());
    };

    let required = requirements.len() == 1;
    let mut seen = HashSet::new();
    let mut params = Vec::new();
    for name in requirements.iter().flatten() {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let Some(scheme) = schemes.get(name) else {
            continue;
        };
        let mut param = if scheme.get("type").and_then(Value::as_str) == Some("apiKey") {
            api_key_parameter(name, scheme)?
        } else {
            ParameterDecl::header("Authorization")
        };
        param.param_type = Some("string".to_string());
        param.required = Some(required);
        params.push(param);
    }
    Ok(params)
}

fn api_key_parameter(scheme_name: &str, scheme: &Value) -> Result<ParameterDecl, RequestError> {
    let invalid = |detail: String| RequestError::InvalidParameter(scheme_name.to_string(), detail);
    let name = scheme
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("apiKey scheme has no 'name'".to_string()))?;
    let location: ParamLocation = scheme
        .get("in")
        .cloned()
        .ok_or_else(|| invalid("apiKey scheme has no 'in'".to_string()))
        .and_then(|v| serde_json::from_value(v).map_err(|e| invalid(e.to_string())))?;
    Ok(ParameterDecl {
        name: name.to_string(),
        location: Some(location),
        ..ParameterDecl::default()
    })
}

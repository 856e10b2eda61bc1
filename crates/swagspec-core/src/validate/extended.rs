//! Nullable-aware JSON Schema dialect
//!
//! Schemas tagged with [`EXTENDED_SCHEMA_URI`] are validated as Draft 4 with
//! one extension: a schema node marked `nullable: true` (OpenAPI 3) or
//! `x-nullable: true` (Swagger 2 vendor extension) also accepts `null`. The
//! marker is lowered into plain Draft 4 before compilation, so the base
//! type check itself is untouched.

use serde_json::{Map, Value, json};

use super::ValidationError;

/// `$schema` identifier selecting the nullable-aware dialect
pub const EXTENDED_SCHEMA_URI: &str = "http://tempuri.org/swagspec/extended_schema";

const NULLABLE_MARKERS: &[&str] = &["nullable", "x-nullable"];

/// Keywords whose values are data, not subschemas
const LITERAL_KEYWORDS: &[&str] = &["enum", "const", "default", "example", "examples"];

/// Keywords whose values map arbitrary names to subschemas
const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties", "definitions", "schemas"];

/// Validation capability: schema + instance in, ordered violations out
pub trait SchemaValidator {
    /// Every violation of `schema` by `instance`, in validator order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSchema`] if the schema does not
    /// compile.
    fn violations(&self, schema: &Value, instance: &Value) -> Result<Vec<String>, ValidationError>;
}

/// `jsonschema`-backed validator that understands the extended dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedSchemaValidator;

impl SchemaValidator for ExtendedSchemaValidator {
    fn violations(&self, schema: &Value, instance: &Value) -> Result<Vec<String>, ValidationError> {
        let compiled = if schema.get("$schema").and_then(Value::as_str) == Some(EXTENDED_SCHEMA_URI) {
            let mut lowered = schema.clone();
            if let Value::Object(map) = &mut lowered {
                map.shift_remove("$schema");
            }
            lower_nullable(&mut lowered);
            jsonschema::options()
                .with_draft(jsonschema::Draft::Draft4)
                .build(&lowered)
        } else {
            jsonschema::validator_for(schema)
        }
        .map_err(|e| ValidationError::InvalidSchema(e.to_string()))?;

        Ok(compiled.iter_errors(instance).map(|e| e.to_string()).collect())
    }
}

/// Rewrite every nullable-marked node so Draft 4 accepts `null` there.
pub fn lower_nullable(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                match (key.as_str(), child) {
                    (key, Value::Object(named)) if SCHEMA_MAP_KEYWORDS.contains(&key) => {
                        named.values_mut().for_each(lower_nullable);
                    }
                    (key, _) if LITERAL_KEYWORDS.contains(&key) => {}
                    (_, child) => lower_nullable(child),
                }
            }
            let marked = NULLABLE_MARKERS
                .iter()
                .any(|marker| map.get(*marker) == Some(&Value::Bool(true)));
            if marked {
                allow_null(map);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(lower_nullable),
        _ => {}
    }
}

fn allow_null(node: &mut Map<String, Value>) {
    if let Some(reference) = node.shift_remove("$ref") {
        node.insert(
            "anyOf".to_string(),
            json!([{"$ref": reference}, {"type": "null"}]),
        );
        return;
    }

    if let Some(kind) = node.get_mut("type") {
        match kind {
            Value::String(name) if name != "null" => {
                *kind = json!([name.clone(), "null"]);
            }
            Value::Array(names) if !names.iter().any(|n| n.as_str() == Some("null")) => {
                names.push(Value::String("null".to_string()));
            }
            _ => {}
        }
    }
    if let Some(Value::Array(allowed)) = node.get_mut("enum") {
        if !allowed.contains(&Value::Null) {
            allowed.push(Value::Null);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extended(schema: Value) -> Value {
        let mut schema = schema;
        if let Value::Object(map) = &mut schema {
            map.insert("$schema".into(), json!(EXTENDED_SCHEMA_URI));
        }
        schema
    }

    #[test]
    fn lowers_string_type() {
        let mut schema = json!({"type": "string", "nullable": true});
        lower_nullable(&mut schema);
        assert_eq!(schema["type"], json!(["string", "null"]));
    }

    #[test]
    fn lowers_type_list_and_enum() {
        let mut schema = json!({"type": ["string", "integer"], "enum": ["a", 1], "x-nullable": true});
        lower_nullable(&mut schema);
        assert_eq!(schema["type"], json!(["string", "integer", "null"]));
        assert_eq!(schema["enum"], json!(["a", 1, null]));
    }

    #[test]
    fn lowers_reference() {
        let mut schema = json!({"$ref": "#/definitions/Widget", "x-nullable": true});
        lower_nullable(&mut schema);
        assert_eq!(
            schema["anyOf"],
            json!([{"$ref": "#/definitions/Widget"}, {"type": "null"}])
        );
        assert!(schema.get("$ref").is_none());
    }

    #[test]
    fn leaves_literal_values_alone() {
        let mut schema = json!({"type": "object", "example": {"type": "string", "nullable": true}});
        lower_nullable(&mut schema);
        assert_eq!(schema["example"]["type"], json!("string"));
    }

    #[test]
    fn properties_named_like_literal_keywords_are_lowered() {
        let nullable = json!({"type": "string", "nullable": true});
        let schema = extended(json!({
            "type": "object",
            "properties": {"default": nullable, "example": nullable, "other": nullable}
        }));
        let violations = ExtendedSchemaValidator
            .violations(&schema, &json!({"default": null, "example": null, "other": null}))
            .unwrap();
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn shared_schemas_named_like_literal_keywords_are_lowered() {
        let mut schema = json!({
            "definitions": {"default": {"type": "integer", "x-nullable": true}},
            "components": {"schemas": {"enum": {"type": "string", "nullable": true}}}
        });
        lower_nullable(&mut schema);
        assert_eq!(schema["definitions"]["default"]["type"], json!(["integer", "null"]));
        assert_eq!(schema["components"]["schemas"]["enum"]["type"], json!(["string", "null"]));
    }

    #[test]
    fn nullable_property_accepts_null() {
        let schema = extended(json!({
            "type": "object",
            "properties": {"name": {"type": "string", "nullable": true}}
        }));
        let violations = ExtendedSchemaValidator
            .violations(&schema, &json!({"name": null}))
            .unwrap();
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn non_nullable_property_rejects_null() {
        let schema = extended(json!({
            "type": "object",
            "properties": {"name": {"type": "string", "nullable": false}}
        }));
        let violations = ExtendedSchemaValidator
            .violations(&schema, &json!({"name": null}))
            .unwrap();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn plain_schema_ignores_nullable_marker() {
        let schema = json!({"type": "string", "nullable": true});
        let violations = ExtendedSchemaValidator.violations(&schema, &Value::Null).unwrap();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn invalid_schema_is_reported() {
        let schema = extended(json!({"type": 12}));
        let err = ExtendedSchemaValidator
            .violations(&schema, &json!({}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSchema(_)));
    }
}

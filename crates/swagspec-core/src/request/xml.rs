//! XML payload encoding for form-shaped request bodies
//!
//! Element names are dasherized keys; keys that are not XML names are
//! rejected. Non-string scalars carry a `type` attribute so the receiving
//! side can restore them; arrays wrap one child per item under a singular
//! name; `null` becomes an empty element marked `nil="true"`.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};

use super::RequestError;

pub const DEFAULT_ROOT: &str = "root";

/// Root element for an operation: the last segment of its path template.
///
/// Templated (`{id}`) or empty segments fall back to [`DEFAULT_ROOT`].
#[must_use]
pub fn root_name(template: &str) -> &str {
    match template.rsplit('/').next() {
        Some(segment) if !segment.is_empty() && !segment.contains('{') => segment,
        _ => DEFAULT_ROOT,
    }
}

/// Encode `fields` as an XML document under `root`.
///
/// # Errors
///
/// Returns [`RequestError::Encode`] if a key is not a valid element name or
/// the writer fails.
pub fn encode(root: &str, fields: &Map<String, Value>) -> Result<String, RequestError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_object(&mut writer, &element_name(root)?, fields)?;
    String::from_utf8(writer.into_inner()).map_err(|e| encode_error(&e))
}

fn write_object(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    fields: &Map<String, Value>,
) -> Result<(), RequestError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    for (key, value) in fields {
        write_value(writer, &element_name(key)?, value)?;
    }
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), RequestError> {
    match value {
        Value::Object(fields) => write_object(writer, name, fields),
        Value::Null => {
            let mut element = BytesStart::new(name);
            element.push_attribute(("nil", "true"));
            emit(writer, Event::Empty(element))
        }
        Value::Array(items) => {
            let mut element = BytesStart::new(name);
            element.push_attribute(("type", "array"));
            emit(writer, Event::Start(element))?;
            let child = singular(name);
            for item in items {
                write_value(writer, child, item)?;
            }
            emit(writer, Event::End(BytesEnd::new(name)))
        }
        Value::String(text) => write_text(writer, BytesStart::new(name), text),
        Value::Bool(flag) => {
            let mut element = BytesStart::new(name);
            element.push_attribute(("type", "boolean"));
            write_text(writer, element, &flag.to_string())
        }
        Value::Number(number) => {
            let mut element = BytesStart::new(name);
            let kind = if number.is_f64() { "float" } else { "integer" };
            element.push_attribute(("type", kind));
            write_text(writer, element, &number.to_string())
        }
    }
}

fn write_text(
    writer: &mut Writer<Vec<u8>>,
    element: BytesStart<'_>,
    text: &str,
) -> Result<(), RequestError> {
    let end = element.to_end().into_owned();
    emit(writer, Event::Start(element))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(end))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), RequestError> {
    writer.write_event(event).map_err(|e| encode_error(&e))
}

fn encode_error(error: &dyn std::fmt::Display) -> RequestError {
    RequestError::Encode("XML", error.to_string())
}

/// Dasherized `key`, rejected unless it is a plain XML name.
fn element_name(key: &str) -> Result<String, RequestError> {
    let name = key.replace('_', "-");
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.'));
    if valid && !name.to_ascii_lowercase().starts_with("xml") {
        Ok(name)
    } else {
        Err(RequestError::Encode("XML", format!("invalid element name '{key}'")))
    }
}

fn singular(name: &str) -> &str {
    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}

//! Value sources: where an example's concrete parameter values come from

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

/// Raised when a value is needed but the source has none for that name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no value provided for '{0}'")]
pub struct MissingValue(pub String);

/// Named lookup of example values.
///
/// `try_get` is the optional lookup; `get` is for values the request cannot
/// be built without and turns absence into [`MissingValue`].
pub trait ValueSource {
    fn try_get(&self, name: &str) -> Option<Value>;

    fn contains(&self, name: &str) -> bool {
        self.try_get(name).is_some()
    }

    /// # Errors
    ///
    /// Returns [`MissingValue`] when the source has no value for `name`.
    fn get(&self, name: &str) -> Result<Value, MissingValue> {
        self.try_get(name)
            .ok_or_else(|| MissingValue(name.to_string()))
    }
}

impl ValueSource for Map<String, Value> {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl ValueSource for HashMap<String, Value> {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl ValueSource for BTreeMap<String, Value> {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    fn try_get(&self, name: &str) -> Option<Value> {
        (**self).try_get(name)
    }
}

/// Render a value the way it appears in a path, query string or header.
#[must_use]
pub fn param_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

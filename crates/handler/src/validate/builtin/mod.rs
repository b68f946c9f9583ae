//! Built-in validator adapters, one per supported schema dialect.
//!
//! Fingerprints are deliberately narrow to avoid false positives across
//! dialects; where two dialects share a shape (a bare `{"type": "string"}`
//! is valid in more than one), the fixed lookup order of the registry
//! decides, and a custom registration pre-empts all of them.

mod json_schema;
mod rules;
mod typedef;

pub use json_schema::JsonSchemaAdapter;
pub use rules::RulesAdapter;
pub use typedef::TypedefAdapter;

use crate::ValidationError;
use serde_json::Value;

/// Dotted-path helper shared by the dialect engines.
fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Builds a [`ValidationError`] anchored at `path`, echoing the value.
fn fail(path: &str, value: &Value, message: String) -> ValidationError {
    let err = ValidationError::new(message).with_value(value.clone());
    if path.is_empty() {
        err
    } else {
        err.with_field(path)
    }
}

/// Human-readable JSON type name, used in error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! JSON Schema dialect adapter (practical keyword subset).

use super::{fail, join_path, type_name};
use crate::validate::ValidatorAdapter;
use crate::BoxError;
use async_trait::async_trait;
use serde_json::Value;

const JSON_TYPES: [&str; 7] = ["object", "array", "string", "number", "integer", "boolean", "null"];

/// Adapter for JSON Schema documents.
///
/// Detected by the `$schema` marker, an object-valued `properties`, an
/// array-valued `enum`, or a `type` drawn from the JSON Schema type
/// vocabulary. Validates `type`, `enum`, `const`, `required`, `properties`,
/// `items` and the standard length/bound keywords; unknown keywords are
/// ignored, as the dialect prescribes.
pub struct JsonSchemaAdapter;

#[async_trait]
impl ValidatorAdapter for JsonSchemaAdapter {
    fn name(&self) -> &str {
        "json-schema"
    }

    fn detect(&self, schema: &Value) -> bool {
        let Some(map) = schema.as_object() else {
            return false;
        };
        if map.contains_key("$schema") {
            return true;
        }
        if matches!(map.get("properties"), Some(Value::Object(_))) {
            return true;
        }
        if matches!(map.get("enum"), Some(Value::Array(_))) {
            return true;
        }
        match map.get("type") {
            Some(Value::String(t)) => JSON_TYPES.contains(&t.as_str()),
            Some(Value::Array(types)) => {
                types.iter().all(|t| matches!(t, Value::String(s) if JSON_TYPES.contains(&s.as_str())))
            }
            _ => false,
        }
    }

    async fn parse(&self, schema: &Value, data: Value) -> Result<Value, BoxError> {
        check(schema, &data, "")?;
        Ok(data)
    }
}

fn check(schema: &Value, data: &Value, path: &str) -> Result<(), BoxError> {
    let Some(rules) = schema.as_object() else {
        return Ok(());
    };

    if let Some(expected) = rules.get("type") {
        check_type(expected, data, path)?;
    }

    if let Some(allowed) = rules.get("enum").and_then(Value::as_array) {
        if !allowed.contains(data) {
            return Err(fail(path, data, "value is not one of the allowed enum values".to_string()).into());
        }
    }

    if let Some(expected) = rules.get("const") {
        if data != expected {
            return Err(fail(path, data, format!("value must equal the constant {expected}")).into());
        }
    }

    check_bounds(rules, data, path)?;

    if let Some(required) = rules.get("required").and_then(Value::as_array) {
        if let Some(object) = data.as_object() {
            for name in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(name) {
                    let field = join_path(path, name);
                    return Err(fail(&field, &Value::Null, format!("required property `{name}` is missing")).into());
                }
            }
        }
    }

    if let Some(properties) = rules.get("properties").and_then(Value::as_object) {
        if let Some(object) = data.as_object() {
            for (name, sub_schema) in properties {
                if let Some(value) = object.get(name) {
                    check(sub_schema, value, &join_path(path, name))?;
                }
            }
        }
    }

    if let Some(items) = rules.get("items") {
        if let Some(array) = data.as_array() {
            for (index, item) in array.iter().enumerate() {
                check(items, item, &format!("{path}[{index}]"))?;
            }
        }
    }

    Ok(())
}

fn check_type(expected: &Value, data: &Value, path: &str) -> Result<(), BoxError> {
    let matched = match expected {
        Value::String(t) => matches_type(t, data),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| matches_type(t, data)),
        _ => true,
    };
    if matched {
        Ok(())
    } else {
        Err(fail(path, data, format!("expected type {expected}, got `{}`", type_name(data))).into())
    }
}

fn matches_type(expected: &str, data: &Value) -> bool {
    match expected {
        "object" => data.is_object(),
        "array" => data.is_array(),
        "string" => data.is_string(),
        "number" => data.is_number(),
        "integer" => data.as_i64().is_some() || data.as_u64().is_some(),
        "boolean" => data.is_boolean(),
        "null" => data.is_null(),
        _ => false,
    }
}

fn check_bounds(rules: &serde_json::Map<String, Value>, data: &Value, path: &str) -> Result<(), BoxError> {
    if let (Some(min), Some(n)) = (rules.get("minimum").and_then(Value::as_f64), data.as_f64()) {
        if n < min {
            return Err(fail(path, data, format!("value {n} is below the minimum {min}")).into());
        }
    }
    if let (Some(max), Some(n)) = (rules.get("maximum").and_then(Value::as_f64), data.as_f64()) {
        if n > max {
            return Err(fail(path, data, format!("value {n} is above the maximum {max}")).into());
        }
    }
    if let Some(s) = data.as_str() {
        let length = s.chars().count() as u64;
        if let Some(min) = rules.get("minLength").and_then(Value::as_u64) {
            if length < min {
                return Err(fail(path, data, format!("string is shorter than minLength {min}")).into());
            }
        }
        if let Some(max) = rules.get("maxLength").and_then(Value::as_u64) {
            if length > max {
                return Err(fail(path, data, format!("string is longer than maxLength {max}")).into());
            }
        }
    }
    if let Some(array) = data.as_array() {
        let length = array.len() as u64;
        if let Some(min) = rules.get("minItems").and_then(Value::as_u64) {
            if length < min {
                return Err(fail(path, data, format!("array has fewer than minItems {min}")).into());
            }
        }
        if let Some(max) = rules.get("maxItems").and_then(Value::as_u64) {
            if length > max {
                return Err(fail(path, data, format!("array has more than maxItems {max}")).into());
            }
        }
    }
    Ok(())
}

//! JSON Typedef (RFC 8927) dialect adapter.

use super::{fail, join_path, type_name};
use crate::validate::ValidatorAdapter;
use crate::BoxError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Primitive names that exist only in the Typedef vocabulary; they make a
/// `type` form unambiguously this dialect.
const TYPEDEF_ONLY_TYPES: [&str; 9] =
    ["timestamp", "float32", "float64", "int8", "uint8", "int16", "uint16", "int32", "uint32"];

/// Adapter for JSON Typedef schemas.
///
/// Detected by the Typedef-specific form keys (`optionalProperties`,
/// `elements`, `values`, `discriminator` + `mapping`) or a `type` drawn
/// from the Typedef-only primitive names. Shapes shared with JSON Schema
/// (a bare `properties`, `type: "string"`) resolve to the json-schema
/// adapter through registry order.
pub struct TypedefAdapter;

#[async_trait]
impl ValidatorAdapter for TypedefAdapter {
    fn name(&self) -> &str {
        "typedef"
    }

    fn detect(&self, schema: &Value) -> bool {
        let Some(map) = schema.as_object() else {
            return false;
        };
        if matches!(map.get("optionalProperties"), Some(Value::Object(_)))
            || matches!(map.get("elements"), Some(Value::Object(_)))
            || matches!(map.get("values"), Some(Value::Object(_)))
        {
            return true;
        }
        if map.get("discriminator").is_some_and(Value::is_string)
            && matches!(map.get("mapping"), Some(Value::Object(_)))
        {
            return true;
        }
        matches!(map.get("type"), Some(Value::String(t)) if TYPEDEF_ONLY_TYPES.contains(&t.as_str()))
    }

    async fn parse(&self, schema: &Value, data: Value) -> Result<Value, BoxError> {
        check(schema, &data, "")?;
        Ok(data)
    }
}

fn check(schema: &Value, data: &Value, path: &str) -> Result<(), BoxError> {
    let Some(form) = schema.as_object() else {
        return Ok(());
    };

    // the empty form accepts anything
    if form.is_empty() {
        return Ok(());
    }

    if form.get("nullable").is_some_and(|n| n == &Value::Bool(true)) && data.is_null() {
        return Ok(());
    }

    if let Some(Value::String(primitive)) = form.get("type") {
        return check_primitive(primitive, data, path);
    }

    if let Some(allowed) = form.get("enum").and_then(Value::as_array) {
        let matched = data.as_str().is_some_and(|s| allowed.iter().any(|v| v.as_str() == Some(s)));
        if !matched {
            return Err(fail(path, data, "value is not one of the enum variants".to_string()).into());
        }
        return Ok(());
    }

    if let Some(elements) = form.get("elements") {
        let Some(array) = data.as_array() else {
            return Err(fail(path, data, format!("expected an array, got `{}`", type_name(data))).into());
        };
        for (index, item) in array.iter().enumerate() {
            check(elements, item, &format!("{path}[{index}]"))?;
        }
        return Ok(());
    }

    if let Some(values) = form.get("values") {
        let Some(object) = data.as_object() else {
            return Err(fail(path, data, format!("expected an object, got `{}`", type_name(data))).into());
        };
        for (key, item) in object {
            check(values, item, &join_path(path, key))?;
        }
        return Ok(());
    }

    if let (Some(Value::String(tag)), Some(Value::Object(mapping))) = (form.get("discriminator"), form.get("mapping")) {
        return check_discriminated(tag, mapping, data, path);
    }

    if form.contains_key("properties") || form.contains_key("optionalProperties") {
        return check_properties(form, data, path);
    }

    Ok(())
}

fn check_primitive(primitive: &str, data: &Value, path: &str) -> Result<(), BoxError> {
    let ok = match primitive {
        "boolean" => data.is_boolean(),
        "string" => data.is_string(),
        "timestamp" => data.as_str().is_some_and(looks_like_timestamp),
        "float32" | "float64" => data.is_number(),
        "int8" => int_in_range(data, -128, 127),
        "uint8" => int_in_range(data, 0, 255),
        "int16" => int_in_range(data, -32_768, 32_767),
        "uint16" => int_in_range(data, 0, 65_535),
        "int32" => int_in_range(data, -2_147_483_648, 2_147_483_647),
        "uint32" => int_in_range(data, 0, 4_294_967_295),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(fail(path, data, format!("expected `{primitive}`, got `{}`", type_name(data))).into())
    }
}

fn int_in_range(data: &Value, min: i64, max: i64) -> bool {
    data.as_i64().is_some_and(|n| n >= min && n <= max)
}

/// RFC 3339 shape check, deliberately shallow: `YYYY-MM-DDThh:mm:ss...`.
fn looks_like_timestamp(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 19
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && (bytes[10] == b'T' || bytes[10] == b't')
        && bytes[13] == b':'
        && bytes[16] == b':'
}

fn check_discriminated(tag: &str, mapping: &Map<String, Value>, data: &Value, path: &str) -> Result<(), BoxError> {
    let Some(object) = data.as_object() else {
        return Err(fail(path, data, format!("expected an object, got `{}`", type_name(data))).into());
    };
    let Some(variant) = object.get(tag).and_then(Value::as_str) else {
        let field = join_path(path, tag);
        return Err(fail(&field, &Value::Null, format!("missing discriminator `{tag}`")).into());
    };
    let Some(variant_schema) = mapping.get(variant) else {
        let field = join_path(path, tag);
        return Err(fail(&field, object.get(tag).unwrap_or(&Value::Null), format!("unknown variant `{variant}`")).into());
    };

    // the discriminator key itself is not part of the variant schema
    let mut rest = object.clone();
    rest.remove(tag);
    check(variant_schema, &Value::Object(rest), path)
}

fn check_properties(form: &Map<String, Value>, data: &Value, path: &str) -> Result<(), BoxError> {
    let Some(object) = data.as_object() else {
        return Err(fail(path, data, format!("expected an object, got `{}`", type_name(data))).into());
    };

    let empty = Map::new();
    let required = form.get("properties").and_then(Value::as_object).unwrap_or(&empty);
    let optional = form.get("optionalProperties").and_then(Value::as_object).unwrap_or(&empty);

    for (name, sub_schema) in required {
        let field = join_path(path, name);
        match object.get(name) {
            Some(value) => check(sub_schema, value, &field)?,
            None => return Err(fail(&field, &Value::Null, format!("missing property `{name}`")).into()),
        }
    }
    for (name, sub_schema) in optional {
        if let Some(value) = object.get(name) {
            check(sub_schema, value, &join_path(path, name))?;
        }
    }

    let extra_allowed = form.get("additionalProperties").is_some_and(|v| v == &Value::Bool(true));
    if !extra_allowed {
        for name in object.keys() {
            if !required.contains_key(name) && !optional.contains_key(name) {
                let field = join_path(path, name);
                return Err(fail(&field, &object[name], format!("unexpected property `{name}`")).into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_typedef_forms_only() {
        let adapter = TypedefAdapter;
        assert!(adapter.detect(&json!({"optionalProperties": {"note": {"type": "string"}}})));
        assert!(adapter.detect(&json!({"elements": {"type": "uint8"}})));
        assert!(adapter.detect(&json!({"values": {"type": "float64"}})));
        assert!(adapter.detect(&json!({"type": "timestamp"})));
        assert!(adapter.detect(&json!({"discriminator": "kind", "mapping": {}})));

        // shapes other dialects own
        assert!(!adapter.detect(&json!({"type": "object"})));
        assert!(!adapter.detect(&json!({"name": "required|string"})));
        assert!(!adapter.detect(&json!([])));
    }

    #[tokio::test]
    async fn properties_reject_unknown_keys() {
        let schema = json!({
            "properties": {"id": {"type": "uint32"}},
            "optionalProperties": {"note": {"type": "string"}}
        });

        let adapter = TypedefAdapter;
        assert!(adapter.parse(&schema, json!({"id": 1, "note": "hi"})).await.is_ok());
        assert!(adapter.parse(&schema, json!({"id": 1, "rogue": true})).await.is_err());
        assert!(adapter.parse(&schema, json!({"note": "hi"})).await.is_err());
    }

    #[tokio::test]
    async fn integer_ranges_are_enforced() {
        let adapter = TypedefAdapter;
        let schema = json!({"type": "uint8"});
        assert!(adapter.parse(&schema, json!(255)).await.is_ok());
        assert!(adapter.parse(&schema, json!(256)).await.is_err());
        assert!(adapter.parse(&schema, json!(-1)).await.is_err());
    }

    #[tokio::test]
    async fn timestamps_need_an_rfc3339_shape() {
        let adapter = TypedefAdapter;
        let schema = json!({"type": "timestamp"});
        assert!(adapter.parse(&schema, json!("2026-08-07T12:00:00Z")).await.is_ok());
        assert!(adapter.parse(&schema, json!("yesterday")).await.is_err());
    }

    #[tokio::test]
    async fn discriminator_picks_the_variant_schema() {
        let schema = json!({
            "discriminator": "kind",
            "mapping": {
                "point": {"properties": {"x": {"type": "float64"}}},
                "label": {"properties": {"text": {"type": "string"}}}
            }
        });

        let adapter = TypedefAdapter;
        assert!(adapter.parse(&schema, json!({"kind": "point", "x": 1.5})).await.is_ok());
        assert!(adapter.parse(&schema, json!({"kind": "label", "x": 1.5})).await.is_err());
        assert!(adapter.parse(&schema, json!({"kind": "circle"})).await.is_err());
    }

    #[tokio::test]
    async fn nullable_admits_null() {
        let adapter = TypedefAdapter;
        let schema = json!({"type": "uint8", "nullable": true});
        assert!(adapter.parse(&schema, json!(null)).await.is_ok());

        let schema = json!({"type": "uint8"});
        assert!(adapter.parse(&schema, json!(null)).await.is_err());
    }
}

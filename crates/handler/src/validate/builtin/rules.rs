//! Pipe-separated rule-string dialect adapter.
//!
//! Schemas are either a single rule string (`"required|string|min:3"`) or
//! a map of field name to rule string, nested maps allowed.

use super::{fail, join_path, type_name};
use crate::validate::ValidatorAdapter;
use crate::BoxError;
use async_trait::async_trait;
use serde_json::Value;

const BARE_RULES: [&str; 9] =
    ["required", "string", "number", "integer", "boolean", "array", "object", "email", "url"];

const PARAM_RULES: [&str; 4] = ["min", "max", "len", "in"];

/// Adapter for rule-string schemas.
///
/// Detected when the schema is a rule string, or an object whose leaf
/// values are all rule strings. Every atom must be a known rule, which
/// keeps the fingerprint narrow: arbitrary string-valued configuration
/// maps do not match.
pub struct RulesAdapter;

#[async_trait]
impl ValidatorAdapter for RulesAdapter {
    fn name(&self) -> &str {
        "rules"
    }

    fn detect(&self, schema: &Value) -> bool {
        is_rule_schema(schema)
    }

    async fn parse(&self, schema: &Value, data: Value) -> Result<Value, BoxError> {
        apply(schema, &data, "")?;
        Ok(data)
    }
}

fn is_rule_schema(schema: &Value) -> bool {
    match schema {
        Value::String(s) => is_rule_string(s),
        Value::Object(map) => !map.is_empty() && map.values().all(is_rule_schema),
        _ => false,
    }
}

fn is_rule_string(s: &str) -> bool {
    !s.is_empty()
        && s.split('|').all(|atom| {
            let atom = atom.trim();
            match atom.split_once(':') {
                Some((name, arg)) => !arg.is_empty() && PARAM_RULES.contains(&name),
                None => BARE_RULES.contains(&atom),
            }
        })
}

fn requires(schema: &Value) -> bool {
    match schema {
        Value::String(s) => s.split('|').any(|atom| atom.trim() == "required"),
        Value::Object(map) => map.values().any(requires),
        _ => false,
    }
}

fn apply(schema: &Value, data: &Value, path: &str) -> Result<(), BoxError> {
    match schema {
        Value::String(rules) => apply_rules(rules, data, path),
        Value::Object(fields) => {
            let Some(object) = data.as_object() else {
                return Err(fail(path, data, format!("expected an object, got `{}`", type_name(data))).into());
            };
            for (name, sub_schema) in fields {
                let field = join_path(path, name);
                match object.get(name) {
                    Some(value) => apply(sub_schema, value, &field)?,
                    None if requires(sub_schema) => {
                        return Err(fail(&field, &Value::Null, format!("field `{name}` is required")).into());
                    }
                    None => {}
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn apply_rules(rules: &str, data: &Value, path: &str) -> Result<(), BoxError> {
    let required = rules.split('|').any(|atom| atom.trim() == "required");
    if data.is_null() {
        return if required {
            Err(fail(path, data, "value is required".to_string()).into())
        } else {
            Ok(())
        };
    }

    for atom in rules.split('|').map(str::trim) {
        match atom.split_once(':') {
            Some((name, arg)) => apply_param_rule(name, arg, data, path)?,
            None => apply_bare_rule(atom, data, path)?,
        }
    }
    Ok(())
}

fn apply_bare_rule(rule: &str, data: &Value, path: &str) -> Result<(), BoxError> {
    let ok = match rule {
        "required" => true, // presence handled by the caller
        "string" => data.is_string(),
        "number" => data.is_number(),
        "integer" => data.as_i64().is_some() || data.as_u64().is_some(),
        "boolean" => data.is_boolean(),
        "array" => data.is_array(),
        "object" => data.is_object(),
        "email" => data.as_str().is_some_and(looks_like_email),
        "url" => data
            .as_str()
            .is_some_and(|s| s.starts_with("http://") || s.starts_with("https://")),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(fail(path, data, format!("value does not satisfy `{rule}`")).into())
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

fn apply_param_rule(name: &str, arg: &str, data: &Value, path: &str) -> Result<(), BoxError> {
    match name {
        "min" | "max" | "len" => {
            let Ok(bound) = arg.parse::<f64>() else {
                return Ok(());
            };
            let Some(measure) = measure(data) else {
                return Ok(());
            };
            let ok = match name {
                "min" => measure >= bound,
                "max" => measure <= bound,
                _ => (measure - bound).abs() < f64::EPSILON,
            };
            if ok {
                Ok(())
            } else {
                Err(fail(path, data, format!("value violates `{name}:{arg}`")).into())
            }
        }
        "in" => {
            let matched = match data {
                Value::String(s) => arg.split(',').any(|option| option.trim() == s),
                Value::Number(n) => arg.split(',').any(|option| option.trim() == n.to_string()),
                _ => false,
            };
            if matched {
                Ok(())
            } else {
                Err(fail(path, data, format!("value is not one of `{arg}`")).into())
            }
        }
        _ => Ok(()),
    }
}

/// What `min`/`max`/`len` measure: string length, numeric value, or array
/// length, by data type.
fn measure(data: &Value) -> Option<f64> {
    match data {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Number(n) => n.as_f64(),
        Value::Array(a) => Some(a.len() as f64),
        _ => None,
    }
}

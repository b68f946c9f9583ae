//! Validator detection and delegation.
//!
//! Validation itself belongs to the adapters; this module only detects
//! which adapter claims a schema value and hands the data over. Custom
//! registrations always out-rank the built-in list.

mod adapter;
mod registry;

pub mod builtin;

pub use adapter::ValidatorAdapter;
pub use registry::{clear_adapters, detect_validator, register_adapter};

use serde_json::Value;

/// The reserved request-part keys of a multi-part input schema, in the
/// order the input validation stage visits them.
pub const RESERVED_KEYS: [&str; 4] = ["body", "query", "params", "headers"];

/// Top-level keys that mark a value as a schema-dialect document rather
/// than a map of per-part sub-schemas. Dialect documents carry these
/// keywords the way dynamic validator objects carry methods.
const DIALECT_KEYWORDS: [&str; 13] = [
    "$schema",
    "type",
    "properties",
    "optionalProperties",
    "additionalProperties",
    "items",
    "elements",
    "values",
    "discriminator",
    "required",
    "enum",
    "definitions",
    "nullable",
];

/// Decides whether a schema validates distinct request parts independently
/// rather than one unified payload.
///
/// A schema is multi-part iff it is a JSON object, none of its own
/// top-level keys is a schema-dialect keyword, and at least one of the
/// reserved keys `body`, `query`, `params`, `headers` is present. The
/// decision is taken once, when the schema is attached, and never changes
/// afterward.
pub fn is_multi_part_schema(schema: &Value) -> bool {
    let Some(map) = schema.as_object() else {
        return false;
    };
    if map.keys().any(|key| DIALECT_KEYWORDS.contains(&key.as_str())) {
        return false;
    }
    RESERVED_KEYS.iter().any(|key| map.contains_key(*key))
}

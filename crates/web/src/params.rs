//! Path parameters handed to the adapter by the surrounding router.
//!
//! The adapter owns no routing; whoever matched the route plants a
//! [`PathParams`] in the request extensions and the adapter picks it up as
//! the `params` part of a multi-part input.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Named path segments extracted from the request URL, e.g. `id` in
/// `/users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn to_value(&self) -> Value {
        let map: Map<String, Value> =
            self.entries.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
        Value::Object(map)
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_by_name() {
        let mut params = PathParams::new();
        params.insert("id", "7");

        assert_eq!(params.get("id"), Some("7"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn to_value_is_a_string_object() {
        let params: PathParams = [("id".to_string(), "7".to_string())].into_iter().collect();
        assert_eq!(params.to_value(), json!({"id": "7"}));

        assert_eq!(PathParams::new().to_value(), json!({}));
    }
}

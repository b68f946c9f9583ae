//! The accumulated, middleware-contributed data passed alongside validated
//! input into the handler function.

use serde_json::{Map, Value};

/// A string-keyed bag of [`Value`] entries.
///
/// Each middleware returns a partial `Context`; the pipeline shallow-merges
/// it into the running one. On key conflict the later write wins — this is
/// the documented contract, middlewares registered later override earlier
/// contributions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self { entries: Map::new() }
    }

    /// Builds a one-entry context, handy as a middleware return value.
    pub fn with_entry<K: Into<String>, V: Into<Value>>(key: K, value: V) -> Self {
        let mut ctx = Self::new();
        ctx.insert(key, value);
        ctx
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallow-merges `other` into `self`; keys from `other` win.
    pub fn merge(&mut self, other: Context) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

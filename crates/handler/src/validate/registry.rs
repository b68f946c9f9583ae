//! Process-wide adapter registry.
//!
//! Two ordered lists: custom registrations (append-only, queried in
//! registration order) and the fixed built-in list. They are concatenated
//! only at lookup time, so custom adapters always win.

use super::builtin::{JsonSchemaAdapter, RulesAdapter, TypedefAdapter};
use super::ValidatorAdapter;
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

type AdapterList = Vec<Arc<dyn ValidatorAdapter>>;

static CUSTOM_ADAPTERS: Lazy<ArcSwap<AdapterList>> = Lazy::new(|| ArcSwap::from_pointee(Vec::new()));

static BUILTIN_ADAPTERS: Lazy<AdapterList> = Lazy::new(|| {
    vec![Arc::new(JsonSchemaAdapter), Arc::new(TypedefAdapter), Arc::new(RulesAdapter)]
});

/// Appends a custom adapter to the process-wide list.
///
/// Registration is copy-on-write; in-flight lookups keep the snapshot they
/// loaded. Registration is expected to happen at setup time, before
/// traffic starts.
pub fn register_adapter<A: ValidatorAdapter + 'static>(adapter: A) {
    let adapter: Arc<dyn ValidatorAdapter> = Arc::new(adapter);
    debug!(adapter = adapter.name(), "registering validator adapter");

    let mut next = CUSTOM_ADAPTERS.load().as_ref().clone();
    next.push(adapter);
    CUSTOM_ADAPTERS.store(Arc::new(next));
}

/// Empties the custom list. Test/reset utility.
pub fn clear_adapters() {
    CUSTOM_ADAPTERS.store(Arc::new(Vec::new()));
}

/// Returns the first adapter claiming `schema`: custom registrations in
/// registration order, then the built-ins (json-schema, typedef, rules).
/// `None` is a valid outcome, not an error.
pub fn detect_validator(schema: &Value) -> Option<Arc<dyn ValidatorAdapter>> {
    let custom = CUSTOM_ADAPTERS.load();
    custom
        .iter()
        .chain(BUILTIN_ADAPTERS.iter())
        .find(|adapter| adapter.detect(schema))
        .map(Arc::clone)
}

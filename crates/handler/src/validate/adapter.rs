use crate::BoxError;
use async_trait::async_trait;
use serde_json::Value;

/// A capability wrapping one schema dialect behind a uniform
/// detect-and-parse contract.
///
/// Adapters are stateless and shared via `Arc` across all handlers.
/// `detect` must be a pure structural predicate over the schema value —
/// never over the data being validated — and must not panic. Detection
/// runs on every validation call; schemas are typically static and the
/// predicate is assumed cheap.
#[async_trait]
pub trait ValidatorAdapter: Send + Sync {
    /// Short dialect name, used in logs.
    fn name(&self) -> &str;

    /// Whether this adapter claims the given schema value.
    fn detect(&self, schema: &Value) -> bool;

    /// Validates `data` against `schema`, returning the parsed value.
    ///
    /// Failures should be [`ValidationError`](crate::ValidationError)s; any
    /// other error type gets wrapped into one by the pipeline, with the
    /// original kept as its source.
    async fn parse(&self, schema: &Value, data: Value) -> Result<Value, BoxError>;
}

//! The immutable handler builder.
//!
//! Every chain method clones the handler, overwrites exactly one stage
//! field (or appends one middleware) and returns the clone; an instance is
//! never mutated after a chain method returns. Clones share the stage
//! functions behind `Arc`s, so deriving handlers is cheap, and a clone owns
//! a fresh middleware vector so appends are never visible on the parent.

use crate::config::ConfigPatch;
use crate::middleware::Middleware;
use crate::stage::{HandlerFn, TransformFn};
use crate::validate::{is_multi_part_schema, ValidatorAdapter};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A composable request/data handler: input validation, context-building
/// middleware, business logic, output transformation and output validation
/// chained into one unit.
///
/// # Example
/// ```
/// # use micro_handler::{handler_fn, Handler, PipelineError, Context};
/// # use serde_json::{json, Value};
/// async fn double(input: Value, _ctx: Context) -> Result<Value, PipelineError> {
///     let n = input["n"].as_i64().unwrap_or(0);
///     Ok(json!({"doubled": n * 2}))
/// }
///
/// let handler = Handler::new()
///     .input(json!({"n": "required|integer"}))
///     .handle(handler_fn(double));
/// ```
#[derive(Clone)]
pub struct Handler {
    pub(crate) input: Option<InputValidator>,
    pub(crate) output: Option<OutputValidator>,
    pub(crate) middlewares: Vec<Arc<dyn Middleware>>,
    pub(crate) handler_fn: Option<Arc<dyn HandlerFn>>,
    pub(crate) transform_fn: Option<Arc<dyn TransformFn>>,
    pub(crate) config: ConfigPatch,
}

#[derive(Clone)]
pub(crate) struct InputValidator {
    pub(crate) schema: Value,
    pub(crate) adapter: Option<Arc<dyn ValidatorAdapter>>,
    pub(crate) multi: bool,
}

#[derive(Clone)]
pub(crate) struct OutputValidator {
    pub(crate) schema: Value,
    pub(crate) adapter: Option<Arc<dyn ValidatorAdapter>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::with_config(ConfigPatch::new())
    }

    /// Creates a handler whose instance overrides shadow the process-wide
    /// defaults. The merge happens fresh on every `execute` call, so later
    /// global configuration changes still take effect.
    pub fn with_config(config: ConfigPatch) -> Self {
        Self {
            input: None,
            output: None,
            middlewares: Vec::new(),
            handler_fn: None,
            transform_fn: None,
            config,
        }
    }

    /// Attaches (or replaces) the input schema; the adapter is auto-detected
    /// per execution. Whether the schema validates distinct request parts is
    /// decided here, once, from its shape. A handler without an input schema
    /// passes raw input through unchanged.
    pub fn input(&self, schema: Value) -> Self {
        let multi = is_multi_part_schema(&schema);
        let mut next = self.clone();
        next.input = Some(InputValidator { schema, adapter: None, multi });
        next
    }

    /// Attaches (or replaces) the input schema with an explicit adapter,
    /// bypassing auto-detection.
    pub fn input_with(&self, schema: Value, adapter: Arc<dyn ValidatorAdapter>) -> Self {
        let multi = is_multi_part_schema(&schema);
        let mut next = self.clone();
        next.input = Some(InputValidator { schema, adapter: Some(adapter), multi });
        next
    }

    /// Appends a context-contributing middleware; execution order is
    /// registration order.
    pub fn middleware<M: Middleware + 'static>(&self, middleware: M) -> Self {
        let mut next = self.clone();
        next.middlewares.push(Arc::new(middleware));
        next
    }

    /// Attaches the business-logic function, replacing any previous one.
    pub fn handle<H: HandlerFn + 'static>(&self, handler: H) -> Self {
        let mut next = self.clone();
        next.handler_fn = Some(Arc::new(handler));
        next
    }

    /// Attaches the post-handler reshaping function.
    pub fn transform<T: TransformFn + 'static>(&self, transform: T) -> Self {
        let mut next = self.clone();
        next.transform_fn = Some(Arc::new(transform));
        next
    }

    /// Attaches (or replaces) the output schema; single-schema only.
    pub fn output(&self, schema: Value) -> Self {
        let mut next = self.clone();
        next.output = Some(OutputValidator { schema, adapter: None });
        next
    }

    /// Attaches (or replaces) the output schema with an explicit adapter.
    pub fn output_with(&self, schema: Value, adapter: Arc<dyn ValidatorAdapter>) -> Self {
        let mut next = self.clone();
        next.output = Some(OutputValidator { schema, adapter: Some(adapter) });
        next
    }

    /// Whether the attached input schema validates distinct request parts
    /// (`body`/`query`/`params`/`headers`) independently.
    pub fn expects_multi_input(&self) -> bool {
        self.input.as_ref().is_some_and(|v| v.multi)
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("input", &self.input.as_ref().map(|v| &v.schema))
            .field("output", &self.output.as_ref().map(|v| &v.schema))
            .field("middlewares", &self.middlewares.len())
            .field("handler_fn", &self.handler_fn.is_some())
            .field("transform_fn", &self.transform_fn.is_some())
            .field("config", &self.config)
            .finish()
    }
}

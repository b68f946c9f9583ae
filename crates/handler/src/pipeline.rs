//! Pipeline execution.
//!
//! `execute` runs the stages in a fixed order: input validation (gated) →
//! middleware context accumulation → handler → transform → output
//! validation (gated). Every stage logs its own failure and re-throws;
//! `execute` adds one top-level log and never swallows an error.

use crate::config::{get_config, Config};
use crate::error::{BoxError, PipelineError, ValidationError};
use crate::handler::Handler;
use crate::validate::{detect_validator, ValidatorAdapter, RESERVED_KEYS};
use crate::Context;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, warn};

impl Handler {
    /// Runs the full pipeline with an empty initial context.
    pub async fn execute(&self, input: Value) -> Result<Value, PipelineError> {
        self.execute_with(input, Context::new()).await
    }

    /// Runs the full pipeline. The initial context seeds the middleware
    /// accumulator; concurrent executions of one handler are independent.
    pub async fn execute_with(&self, input: Value, initial: Context) -> Result<Value, PipelineError> {
        let result = self.run(input, initial).await;
        if let Err(err) = &result {
            error!(error = %err, "handler pipeline failed");
        }
        result
    }

    /// Effective gates: process-wide defaults merged with the instance
    /// overrides, resolved fresh on every call.
    fn effective_config(&self) -> Config {
        get_config().apply(&self.config)
    }

    async fn run(&self, input: Value, initial: Context) -> Result<Value, PipelineError> {
        let Some(handler) = self.handler_fn.as_ref().map(Arc::clone) else {
            error!("execute called on a handler chain without a handle() stage");
            return Err(PipelineError::MissingHandler);
        };
        let config = self.effective_config();

        let input = if config.validate_input { self.check_input(input).await? } else { input };

        let ctx = self.accumulate_context(&input, initial).await?;

        let output = match handler.call(input, ctx.clone()).await {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "handler function failed");
                return Err(err);
            }
        };

        let output = match &self.transform_fn {
            Some(transform) => match transform.call(output, ctx).await {
                Ok(output) => output,
                Err(err) => {
                    warn!(error = %err, "transform failed");
                    return Err(err);
                }
            },
            None => output,
        };

        if config.validate_output {
            self.check_output(output).await
        } else {
            Ok(output)
        }
    }

    /// Input validation stage. Multi-part schemas validate each reserved
    /// key independently; keys absent from the schema are neither validated
    /// nor copied into the result.
    async fn check_input(&self, input: Value) -> Result<Value, PipelineError> {
        let Some(validator) = &self.input else {
            return Ok(input);
        };

        if !validator.multi {
            return self.parse_part(&validator.schema, input, None, validator.adapter.as_ref()).await;
        }

        let Some(schema_parts) = validator.schema.as_object() else {
            return Ok(input);
        };
        let mut checked = Map::new();
        for part in RESERVED_KEYS {
            let Some(part_schema) = schema_parts.get(part) else {
                continue;
            };
            let raw = input.get(part).cloned().unwrap_or(Value::Null);
            let value = self.parse_part(part_schema, raw, Some(part), validator.adapter.as_ref()).await?;
            checked.insert(part.to_string(), value);
        }
        Ok(Value::Object(checked))
    }

    /// Output validation stage; single-schema only.
    async fn check_output(&self, output: Value) -> Result<Value, PipelineError> {
        let Some(validator) = &self.output else {
            return Ok(output);
        };
        self.parse_part(&validator.schema, output, None, validator.adapter.as_ref()).await
    }

    /// Resolves an adapter (explicit override wins, else auto-detection)
    /// and parses one value. A non-empty schema no adapter claims passes
    /// the data through with a warning; it is never an error by itself.
    async fn parse_part(
        &self,
        schema: &Value,
        data: Value,
        part: Option<&str>,
        adapter_override: Option<&Arc<dyn ValidatorAdapter>>,
    ) -> Result<Value, PipelineError> {
        let adapter = match adapter_override {
            Some(adapter) => Some(Arc::clone(adapter)),
            None => detect_validator(schema),
        };
        let Some(adapter) = adapter else {
            if !schema_is_empty(schema) {
                warn!(part = part.unwrap_or("payload"), "no validator adapter matches the schema, passing data through");
            }
            return Ok(data);
        };

        match adapter.parse(schema, data).await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(adapter = adapter.name(), part = part.unwrap_or("payload"), error = %err, "validation failed");
                Err(PipelineError::Validation(classify_parse_error(err, part)))
            }
        }
    }

    /// Middleware stage: strictly sequential, each middleware sees the
    /// cumulative context of its predecessors; returned fragments
    /// shallow-merge with later keys winning.
    async fn accumulate_context(&self, input: &Value, initial: Context) -> Result<Context, PipelineError> {
        let mut ctx = initial;
        for middleware in &self.middlewares {
            match middleware.call(input.clone(), ctx.clone()).await {
                Ok(partial) => ctx.merge(partial),
                Err(err) => {
                    warn!(error = %err, "middleware failed");
                    return Err(err);
                }
            }
        }
        Ok(ctx)
    }
}

/// A parse failure that already is a [`ValidationError`] passes through
/// untouched; anything else gets wrapped once, keeping the original as the
/// source and the request part as the field.
fn classify_parse_error(err: BoxError, part: Option<&str>) -> ValidationError {
    match err.downcast::<ValidationError>() {
        Ok(already) => *already,
        Err(other) => {
            let wrapped = ValidationError::wrap("schema validation failed", other);
            match part {
                Some(name) => wrapped.with_field(name),
                None => wrapped,
            }
        }
    }
}

fn schema_is_empty(schema: &Value) -> bool {
    schema.is_null() || schema.as_object().is_some_and(Map::is_empty)
}

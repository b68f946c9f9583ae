//! Function traits for the business-logic stages of the pipeline.

use crate::{Context, PipelineError};
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

/// The core business-logic function, invoked once per execution with the
/// validated input and the final accumulated context.
#[async_trait]
pub trait HandlerFn: Send + Sync {
    async fn call(&self, input: Value, ctx: Context) -> Result<Value, PipelineError>;
}

/// The optional post-handler, pre-output-validation mapping function.
///
/// Runs strictly between business logic and output validation, so a handler
/// can return a natural domain value while the transform reshapes it into
/// the envelope the output schema expects.
#[async_trait]
pub trait TransformFn: Send + Sync {
    async fn call(&self, output: Value, ctx: Context) -> Result<Value, PipelineError>;
}

/// A [`HandlerFn`] backed by a plain async function, see [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

/// Wraps an async `fn(Value, Context) -> Result<Value, PipelineError>` into
/// a [`HandlerFn`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Value, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, PipelineError>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> HandlerFn for FnHandler<F>
where
    F: Fn(Value, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, PipelineError>> + Send,
{
    async fn call(&self, input: Value, ctx: Context) -> Result<Value, PipelineError> {
        (self.f)(input, ctx).await
    }
}

/// A [`TransformFn`] backed by a plain async function, see [`transform_fn`].
pub struct FnTransform<F> {
    f: F,
}

/// Wraps an async `fn(Value, Context) -> Result<Value, PipelineError>` into
/// a [`TransformFn`].
pub fn transform_fn<F, Fut>(f: F) -> FnTransform<F>
where
    F: Fn(Value, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, PipelineError>> + Send,
{
    FnTransform { f }
}

#[async_trait]
impl<F, Fut> TransformFn for FnTransform<F>
where
    F: Fn(Value, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, PipelineError>> + Send,
{
    async fn call(&self, output: Value, ctx: Context) -> Result<Value, PipelineError> {
        (self.f)(output, ctx).await
    }
}

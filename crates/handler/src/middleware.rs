//! Context-contributing pipeline steps.

use crate::{Context, PipelineError};
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

/// A middleware observes the (possibly validated) input and the context
/// accumulated so far, and returns a partial context to merge in.
///
/// Middlewares run strictly sequentially in registration order; each one
/// sees the contributions of all its predecessors. Errors abort the
/// pipeline immediately and propagate as returned.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn call(&self, input: Value, ctx: Context) -> Result<Context, PipelineError>;
}

/// A [`Middleware`] backed by a plain async function, see [`middleware_fn`].
pub struct FnMiddleware<F> {
    f: F,
}

/// Wraps an async `fn(Value, Context) -> Result<Context, PipelineError>`
/// into a [`Middleware`].
///
/// # Example
/// ```
/// # use micro_handler::{middleware_fn, Context, Handler, PipelineError};
/// # use serde_json::Value;
/// async fn attach_tenant(_input: Value, _ctx: Context) -> Result<Context, PipelineError> {
///     Ok(Context::with_entry("tenant", "acme"))
/// }
///
/// let handler = Handler::new().middleware(middleware_fn(attach_tenant));
/// ```
pub fn middleware_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Value, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Context, PipelineError>> + Send,
{
    FnMiddleware { f }
}

#[async_trait]
impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Value, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Context, PipelineError>> + Send,
{
    async fn call(&self, input: Value, ctx: Context) -> Result<Context, PipelineError> {
        (self.f)(input, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_is_middleware<M: Middleware>(_mw: &M) {
        // no op
    }

    #[test]
    fn async_fn_is_middleware() {
        async fn contribute(_input: Value, _ctx: Context) -> Result<Context, PipelineError> {
            Ok(Context::new())
        }

        let mw = middleware_fn(contribute);
        assert_is_middleware(&mw);
    }

    #[tokio::test]
    async fn fn_middleware_passes_through_arguments() {
        async fn echo(input: Value, mut ctx: Context) -> Result<Context, PipelineError> {
            ctx.insert("seen", input);
            Ok(ctx)
        }

        let mw = middleware_fn(echo);
        let out = mw.call(serde_json::json!(5), Context::new()).await.unwrap();
        assert_eq!(out.get("seen"), Some(&serde_json::json!(5)));
    }
}

//! A small fluent builder for request/data handlers: chain input
//! validation, context-building middleware, business logic, output
//! transformation and output validation into one composable, immutable
//! unit, then run it directly or through an adapter.

mod config;
mod context;
mod error;
mod handler;
mod middleware;
mod pipeline;
mod stage;

pub mod validate;

pub use config::configure;
pub use config::get_config;
pub use config::reset_config;
pub use config::Config;
pub use config::ConfigPatch;
pub use context::Context;
pub use error::BoxError;
pub use error::HandlerError;
pub use error::PipelineError;
pub use error::ValidationError;
pub use handler::Handler;
pub use middleware::middleware_fn;
pub use middleware::FnMiddleware;
pub use middleware::Middleware;
pub use stage::handler_fn;
pub use stage::transform_fn;
pub use stage::FnHandler;
pub use stage::FnTransform;
pub use stage::HandlerFn;
pub use stage::TransformFn;

//! # Middleware Module
//!
//! Middlewares wrap the handler of a matched route. Each one receives the
//! request together with a [`Next`] continuation: calling `next.run(req)`
//! hands control to the remaining middlewares and finally to the handler,
//! returning from `process` without calling it short-circuits the request.
//!
//! Routes name their middlewares declaratively (see
//! [`MiddlewareDeclaration`](crate::MiddlewareDeclaration)). The compiler keeps
//! only declarations whose type is registered, and the dispatcher builds a
//! fresh [`Pipeline`] from them on every request:
//!
//! ```text
//! class-level (declaration order) -> method-level (declaration order) -> handler
//! ```
//!
//! Built-in middlewares registered under these names:
//!
//! - `SetHeader(name, value, times)` - [`SetHeaderMiddleware`]
//! - `BearerAuth(token)` - [`BearerAuthMiddleware`]
//! - `Tracing` - [`TracingMiddleware`]

mod auth;
mod core;
mod headers;
mod resolver;
mod tracing;

pub use auth::BearerAuthMiddleware;
pub use core::{arg_str, Middleware, MiddlewareError, Next, Pipeline};
pub use headers::SetHeaderMiddleware;
pub use resolver::{instantiate, resolve};
pub use tracing::TracingMiddleware;

use crate::registry::Registry;

/// Register the built-in middlewares on a registry.
pub(crate) fn register_builtins(registry: &mut Registry) {
    registry.register_middleware(SetHeaderMiddleware::NAME, SetHeaderMiddleware::from_args);
    registry.register_middleware(BearerAuthMiddleware::NAME, BearerAuthMiddleware::from_args);
    registry.register_middleware(TracingMiddleware::NAME, TracingMiddleware::from_args);
}

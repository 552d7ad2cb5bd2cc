use std::sync::Arc;

use thiserror::Error;

use crate::declaration::MiddlewareArg;
use crate::error::Result;
use crate::message::{Request, Response};

#[derive(Debug, Error)]
pub enum MiddlewareError {
    #[error("middleware `{middleware}` rejected its arguments: {reason}")]
    InvalidArguments { middleware: String, reason: String },

    #[error("middleware `{middleware}` failed: {reason}")]
    Failed { middleware: String, reason: String },
}

/// A request/response transformer around a route handler.
pub trait Middleware: Send + Sync {
    fn process(&self, req: Request, next: Next<'_>) -> Result<Response>;
}

/// The remainder of a middleware chain, ending in the route handler.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Fn(Request) -> Result<Response>,
}

impl<'a> Next<'a> {
    /// Run the rest of the chain with `req`.
    pub fn run(self, req: Request) -> Result<Response> {
        match self.chain.split_first() {
            Some((current, rest)) => current.process(
                req,
                Next {
                    chain: rest,
                    handler: self.handler,
                },
            ),
            None => (self.handler)(req),
        }
    }
}

/// An ordered middleware chain executed synchronously around a handler.
#[derive(Clone, Default)]
pub struct Pipeline {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware; earlier middlewares wrap later ones.
    #[must_use]
    pub fn pipe(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Execute the chain, with `handler` as the innermost step.
    pub fn handle<H>(&self, req: Request, handler: H) -> Result<Response>
    where
        H: Fn(Request) -> Result<Response>,
    {
        Next {
            chain: &self.middlewares,
            handler: &handler,
        }
        .run(req)
    }
}

impl FromIterator<Arc<dyn Middleware>> for Pipeline {
    fn from_iter<T: IntoIterator<Item = Arc<dyn Middleware>>>(iter: T) -> Self {
        Self {
            middlewares: iter.into_iter().collect(),
        }
    }
}

/// Read a string argument at `index`; `None` when absent, an error when it has another type.
pub fn arg_str<'a>(
    middleware: &str,
    args: &'a [MiddlewareArg],
    index: usize,
) -> std::result::Result<Option<&'a str>, MiddlewareError> {
    let Some(arg) = args.get(index) else {
        return Ok(None);
    };
    arg.as_str()
        .map(Some)
        .ok_or_else(|| MiddlewareError::InvalidArguments {
            middleware: middleware.to_string(),
            reason: format!("argument {index} must be a string, got {arg}"),
        })
}

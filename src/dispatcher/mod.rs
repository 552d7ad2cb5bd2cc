//! # Dispatcher Module
//!
//! Turns a parsed [`Request`] into a [`Response`] using the cached route table.
//!
//! ## Request Flow
//!
//! 1. the cache is rebuilt if missing or stale, then loaded;
//! 2. the table is queried with the request method and path;
//! 3. a miss yields the configured not-found response, or 405 with `Allow`;
//! 4. a match runs the route's middlewares, class level first, around the
//!    target: a registered function, or a method on a fresh controller that
//!    has received the request context.
//!
//! ## Error Handling
//!
//! A target that vanished since the table was built is answered with a bare
//! 404. Every other failure is returned to the caller;
//! [`handle`] converts it into a 500 response with a JSON `{"error": ...}` body.

mod core;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::error;

pub use self::core::Dispatcher;
use crate::cache::RouteCache;
use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::message::{Request, Response};
use crate::registry::Registry;
use crate::template::TemplateEngine;

/// Full request lifecycle against the global registry.
///
/// Never fails: build, load and handler errors become a 500 response.
pub fn handle(
    cache_dir: impl AsRef<Path>,
    controller_dir: impl Into<PathBuf>,
    request: Request,
    not_found: Response,
    engine: Option<Arc<dyn TemplateEngine>>,
    extensions: Vec<Arc<dyn Extension>>,
) -> Response {
    let registry = Registry::global();
    let result = RouteCache::new(cache_dir, controller_dir, Arc::clone(&registry), extensions)
        .and_then(|cache| {
            Dispatcher::new(Arc::new(cache), registry, not_found, engine).dispatch(request)
        });
    result.unwrap_or_else(|err| error_response(&err))
}

/// Force a rebuild of the route table, e.g. as a deploy step.
pub fn build_routing_cache(
    cache_dir: impl AsRef<Path>,
    controller_dir: impl Into<PathBuf>,
    extensions: Vec<Arc<dyn Extension>>,
) -> Result<()> {
    let cache = RouteCache::new(cache_dir, controller_dir, Registry::global(), extensions)?;
    cache.ensure(true)?;
    Ok(())
}

/// The outer error boundary's rendering of an unexpected failure.
#[must_use]
pub fn error_response(err: &Error) -> Response {
    error!(error = %err, "Request failed");
    Response::error(500, &err.to_string())
}

use std::sync::Arc;
use std::time::Instant;

use tracing::{field, info, info_span, warn};

use super::core::{Middleware, MiddlewareError, Next};
use crate::declaration::MiddlewareArg;
use crate::error::Result;
use crate::message::{Request, Response};

/// Wraps the rest of the chain in a `request` span and records status and latency.
pub struct TracingMiddleware;

impl TracingMiddleware {
    pub const NAME: &'static str = "Tracing";

    pub fn from_args(_args: &[MiddlewareArg]) -> Result<Arc<dyn Middleware>, MiddlewareError> {
        Ok(Arc::new(TracingMiddleware))
    }
}

impl Middleware for TracingMiddleware {
    fn process(&self, req: Request, next: Next<'_>) -> Result<Response> {
        let span = info_span!(
            "request",
            method = %req.method,
            path = %req.path,
            status = field::Empty,
            latency_ms = field::Empty
        );
        let _entered = span.enter();
        let start = Instant::now();

        let result = next.run(req);
        let latency_ms = start.elapsed().as_millis() as u64;
        span.record("latency_ms", latency_ms);

        match &result {
            Ok(resp) => {
                span.record("status", resp.status);
                info!(status = resp.status, latency_ms, "Request completed");
            }
            Err(e) => warn!(error = %e, latency_ms, "Request failed"),
        }
        result
    }
}

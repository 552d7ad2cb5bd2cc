use std::sync::Arc;

use super::core::{arg_str, Middleware, MiddlewareError, Next};
use crate::declaration::MiddlewareArg;
use crate::error::Result;
use crate::message::{Request, Response};

/// Sets a response header once the rest of the chain has produced a response.
#[derive(Debug, Clone)]
pub struct SetHeaderMiddleware {
    name: String,
    value: String,
}

impl SetHeaderMiddleware {
    pub const NAME: &'static str = "SetHeader";
    /// Upper bound for the `times` argument.
    pub const MAX_TIMES: usize = 64;

    /// `times` > 1 repeats the value, comma-joined.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, times: usize) -> Self {
        let value = value.into();
        let value = vec![value.as_str(); times.clamp(1, Self::MAX_TIMES)].join(",");
        Self {
            name: name.into(),
            value,
        }
    }

    /// Factory used by the registry: `SetHeader(name, value[, times])`.
    pub fn from_args(args: &[MiddlewareArg]) -> Result<Arc<dyn Middleware>, MiddlewareError> {
        let invalid = |reason: &str| MiddlewareError::InvalidArguments {
            middleware: Self::NAME.to_string(),
            reason: reason.to_string(),
        };
        let name = arg_str(Self::NAME, args, 0)?.ok_or_else(|| invalid("missing header name"))?;
        let value = arg_str(Self::NAME, args, 1)?.ok_or_else(|| invalid("missing header value"))?;
        let times = match args.get(2) {
            None => 1,
            Some(MiddlewareArg::Int(n)) => usize::try_from(*n)
                .ok()
                .filter(|t| (1..=Self::MAX_TIMES).contains(t))
                .ok_or_else(|| invalid("times must be between 1 and 64"))?,
            Some(_) => return Err(invalid("times must be an integer")),
        };
        Ok(Arc::new(Self::new(name, value, times)))
    }
}

impl Middleware for SetHeaderMiddleware {
    fn process(&self, req: Request, next: Next<'_>) -> Result<Response> {
        let mut resp = next.run(req)?;
        resp.set_header(&self.name, self.value.clone());
        Ok(resp)
    }
}

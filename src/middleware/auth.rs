use std::sync::Arc;

use tracing::debug;

use super::core::{arg_str, Middleware, MiddlewareError, Next};
use crate::declaration::MiddlewareArg;
use crate::error::Result;
use crate::message::{Request, Response};

/// Rejects requests whose `Authorization` header is not `Bearer <token>`.
pub struct BearerAuthMiddleware {
    token: String,
}

impl BearerAuthMiddleware {
    pub const NAME: &'static str = "BearerAuth";

    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn from_args(args: &[MiddlewareArg]) -> Result<Arc<dyn Middleware>, MiddlewareError> {
        let token = arg_str(Self::NAME, args, 0)?.ok_or_else(|| {
            MiddlewareError::InvalidArguments {
                middleware: Self::NAME.to_string(),
                reason: "missing token".to_string(),
            }
        })?;
        Ok(Arc::new(Self::new(token)))
    }

    fn authorized(&self, req: &Request) -> bool {
        req.get_header("authorization")
            .and_then(|h| h.strip_prefix("Bearer "))
            .is_some_and(|t| t.trim() == self.token)
    }
}

impl Middleware for BearerAuthMiddleware {
    fn process(&self, req: Request, next: Next<'_>) -> Result<Response> {
        if self.authorized(&req) {
            return next.run(req);
        }
        debug!(method = %req.method, path = %req.path, "Bearer token rejected");
        Ok(Response::error(401, "Unauthorized").with_header("www-authenticate", "Bearer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Pipeline;
    use http::Method;

    fn run(req: Request) -> Response {
        Pipeline::new()
            .pipe(Arc::new(BearerAuthMiddleware::new("secret")))
            .handle(req, |_| Ok(Response::new(200)))
            .unwrap()
    }

    #[test]
    fn test_valid_token_passes() {
        let req = Request::new(Method::GET, "/").with_header("Authorization", "Bearer secret");
        assert_eq!(run(req).status, 200);
    }

    #[test]
    fn test_missing_or_wrong_token_is_401() {
        assert_eq!(run(Request::new(Method::GET, "/")).status, 401);
        let req = Request::new(Method::GET, "/").with_header("Authorization", "Bearer nope");
        let resp = run(req);
        assert_eq!(resp.status, 401);
        assert_eq!(resp.get_header("WWW-Authenticate"), Some("Bearer"));
    }
}

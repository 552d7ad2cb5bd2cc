use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::declaration::ControllerDeclaration;
use crate::message::{Request, Response};
use crate::template::TemplateEngine;

/// Failure to call a controller method or function target.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The target exists in the table but not in the program.
    #[error("no handler named `{method}`")]
    UnknownMethod { method: String },

    #[error("handler `{method}` expects {expected} argument(s), got {actual}")]
    Arity {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("argument `{param}` of `{method}` is not a valid {expected}: {value:?}")]
    BadArgument {
        method: String,
        param: String,
        value: String,
        expected: &'static str,
    },

    /// The handler ran and reported an error.
    #[error("handler `{method}` failed: {message}")]
    Handler { method: String, message: String },
}

impl InvokeError {
    /// True when the handler does not exist, which the dispatcher answers with 404.
    #[must_use]
    pub fn is_target_absent(&self) -> bool {
        matches!(self, InvokeError::UnknownMethod { .. })
    }
}

/// Request-scoped data handed to controllers that accept it.
#[derive(Clone)]
pub struct ControllerContext {
    pub request: Request,
    /// Parsed JSON or form body, if the content type was recognized.
    pub body: Option<Value>,
    pub engine: Option<Arc<dyn TemplateEngine>>,
}

impl fmt::Debug for ControllerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerContext")
            .field("request", &self.request)
            .field("body", &self.body)
            .field("engine", &self.engine.is_some())
            .finish()
    }
}

/// Receives the request context before a controller method runs.
pub trait AcceptsContext {
    fn set_request_context(&mut self, context: ControllerContext);
}

/// A type whose methods serve routes.
///
/// Normally implemented by `#[controller]`; a fresh value is created for every
/// request.
pub trait Controller {
    /// Routing metadata of this controller.
    fn declaration() -> ControllerDeclaration
    where
        Self: Sized;

    /// Call the handler method `method` with raw path captures in parameter order.
    fn invoke(&mut self, method: &str, args: Vec<String>) -> Result<Response, InvokeError>;

    fn context_receiver(&mut self) -> Option<&mut dyn AcceptsContext> {
        None
    }
}

/// Conversion of a handler's return value.
pub trait IntoHandlerResult {
    fn into_handler_result(self, method: &str) -> Result<Response, InvokeError>;
}

impl IntoHandlerResult for Response {
    fn into_handler_result(self, _method: &str) -> Result<Response, InvokeError> {
        Ok(self)
    }
}

impl<E: Display> IntoHandlerResult for Result<Response, E> {
    fn into_handler_result(self, method: &str) -> Result<Response, InvokeError> {
        self.map_err(|e| InvokeError::Handler {
            method: method.to_string(),
            message: e.to_string(),
        })
    }
}

/// Parse one raw path capture into a handler parameter.
pub fn parse_arg<T: FromStr>(
    method: &str,
    param: &str,
    expected: &'static str,
    raw: Option<String>,
) -> Result<T, InvokeError> {
    let bad = |value: String| InvokeError::BadArgument {
        method: method.to_string(),
        param: param.to_string(),
        value,
        expected,
    };
    let raw = raw.ok_or_else(|| bad(String::new()))?;
    raw.parse().map_err(|_| bad(raw.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg_converts_and_reports() {
        let id: u32 = parse_arg("get", "id", "u32", Some("42".to_string())).unwrap();
        assert_eq!(id, 42);

        let err = parse_arg::<u32>("get", "id", "u32", Some("abc".to_string())).unwrap_err();
        match err {
            InvokeError::BadArgument { param, value, .. } => {
                assert_eq!(param, "id");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_handler_error_is_not_target_absent() {
        let result: Result<Response, String> = Err("db down".to_string());
        let err = result.into_handler_result("save").unwrap_err();
        assert!(!err.is_target_absent());
        assert!(err.to_string().contains("db down"));
        assert!(InvokeError::UnknownMethod { method: "x".into() }.is_target_absent());
    }
}

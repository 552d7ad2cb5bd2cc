//! Declarative routing metadata attached to controllers.
//!
//! These values are produced by the `#[controller]` attribute (or written by
//! hand when registering a controller programmatically) and consumed by the
//! route table compiler. They carry no behavior of their own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// HTTP methods a route may be declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Options,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported HTTP method `{s}`"))
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

/// A literal constructor argument of a middleware declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MiddlewareArg {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MiddlewareArg {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MiddlewareArg::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MiddlewareArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareArg::Bool(b) => write!(f, "{b}"),
            MiddlewareArg::Int(i) => write!(f, "{i}"),
            MiddlewareArg::Float(x) => write!(f, "{x}"),
            MiddlewareArg::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for MiddlewareArg {
    fn from(value: &str) -> Self {
        MiddlewareArg::Str(value.to_string())
    }
}

impl From<String> for MiddlewareArg {
    fn from(value: String) -> Self {
        MiddlewareArg::Str(value)
    }
}

impl From<i64> for MiddlewareArg {
    fn from(value: i64) -> Self {
        MiddlewareArg::Int(value)
    }
}

impl From<f64> for MiddlewareArg {
    fn from(value: f64) -> Self {
        MiddlewareArg::Float(value)
    }
}

impl From<bool> for MiddlewareArg {
    fn from(value: bool) -> Self {
        MiddlewareArg::Bool(value)
    }
}

/// Names a middleware type and the literal values it is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiddlewareDeclaration {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<MiddlewareArg>,
}

impl MiddlewareDeclaration {
    #[must_use]
    pub fn new(type_name: impl Into<String>, args: Vec<MiddlewareArg>) -> Self {
        Self {
            type_name: type_name.into(),
            args,
        }
    }
}

impl fmt::Display for MiddlewareDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// One `(method, pattern)` binding of a controller method.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDeclaration {
    pub method: HttpMethod,
    /// Pattern relative to the controller base path, possibly empty.
    pub path: String,
    /// Name of the controller method handling the route.
    pub handler: String,
    /// Handler parameter names in declaration order; each must be a path capture.
    pub params: Vec<String>,
    pub middlewares: Vec<MiddlewareDeclaration>,
}

impl RouteDeclaration {
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            handler: handler.into(),
            params: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_middleware(mut self, middleware: MiddlewareDeclaration) -> Self {
        self.middlewares.push(middleware);
        self
    }
}

/// Everything the compiler needs to know about one controller type.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerDeclaration {
    /// Fully qualified type name, e.g. `app::user::UserController`.
    pub type_name: String,
    /// Optional base path; empty means routes sit at the root.
    pub base_path: String,
    /// Class-level middlewares, applied before method-level ones.
    pub middlewares: Vec<MiddlewareDeclaration>,
    pub routes: Vec<RouteDeclaration>,
}

impl ControllerDeclaration {
    #[must_use]
    pub fn new(type_name: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            base_path: base_path.into(),
            middlewares: Vec::new(),
            routes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_middleware(mut self, middleware: MiddlewareDeclaration) -> Self {
        self.middlewares.push(middleware);
        self
    }

    #[must_use]
    pub fn with_route(mut self, route: RouteDeclaration) -> Self {
        self.routes.push(route);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("OPTIONS".parse::<HttpMethod>(), Ok(HttpMethod::Options));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_middleware_args_serialize_as_plain_scalars() {
        let decl = MiddlewareDeclaration::new(
            "SetHeader",
            vec!["X-Test".into(), 2i64.into(), true.into(), 1.5f64.into()],
        );
        let json = serde_json::to_string(&decl).unwrap();
        assert_eq!(json, r#"{"type":"SetHeader","args":["X-Test",2,true,1.5]}"#);
        let back: MiddlewareDeclaration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decl);
    }

    #[test]
    fn test_middleware_declaration_display() {
        let decl = MiddlewareDeclaration::new("BearerAuth", vec!["secret".into()]);
        assert_eq!(decl.to_string(), r#"BearerAuth("secret")"#);
    }
}

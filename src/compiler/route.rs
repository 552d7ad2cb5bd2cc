use std::fmt;

use serde::{Deserialize, Serialize};

use crate::declaration::{HttpMethod, MiddlewareDeclaration};

/// What a matched route invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchTarget {
    /// A function registered by name.
    Function {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        vars: Vec<String>,
    },
    /// A method on a controller type, called on a fresh instance.
    Controller {
        #[serde(rename = "type")]
        type_name: String,
        method: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        vars: Vec<String>,
    },
}

impl DispatchTarget {
    /// Capture names passed to the target, in its parameter order.
    #[must_use]
    pub fn vars(&self) -> &[String] {
        match self {
            DispatchTarget::Function { vars, .. } | DispatchTarget::Controller { vars, .. } => vars,
        }
    }
}

impl fmt::Display for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchTarget::Function { name, vars } => write!(f, "fn {name}({})", vars.join(", ")),
            DispatchTarget::Controller {
                type_name,
                method,
                vars,
            } => write!(f, "{type_name}::{method}({})", vars.join(", ")),
        }
    }
}

/// One entry of the route table, as persisted in the cache artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRoute {
    pub method: HttpMethod,
    /// Full path pattern; empty for the root.
    pub path: String,
    pub target: DispatchTarget,
    /// Resolved middlewares, class level first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<MiddlewareDeclaration>,
}

impl CompiledRoute {
    /// A route to a registered function, typically injected by an extension.
    #[must_use]
    pub fn function<I, S>(
        method: HttpMethod,
        path: impl Into<String>,
        name: impl Into<String>,
        vars: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: path.into(),
            target: DispatchTarget::Function {
                name: name.into(),
                vars: vars.into_iter().map(Into::into).collect(),
            },
            middlewares: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_middleware(mut self, middleware: MiddlewareDeclaration) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// The single artifact line for this route.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{:<7} {path} -> {}", self.method.as_str(), self.target)?;
        if !self.middlewares.is_empty() {
            let names: Vec<String> = self.middlewares.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", names.join(", "))?;
        }
        Ok(())
    }
}

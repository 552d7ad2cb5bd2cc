//! Route table: the queryable form of a compiled artifact.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use thiserror::Error;
use tracing::{debug, warn};

use super::pattern::{PathPattern, PatternError};
use super::radix::{path_segments, InsertError, RadixTree};
use crate::compiler::CompiledRoute;
use crate::message::ParamVec;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid pattern `{path}`: {source}")]
    Pattern {
        path: String,
        #[source]
        source: PatternError,
    },

    #[error("{method} {path} is registered more than once")]
    Duplicate { method: String, path: String },
}

/// A successful lookup: the route and the values bound to its captures.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<CompiledRoute>,
    /// Captures in path order.
    pub path_params: ParamVec,
}

impl RouteMatch {
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Capture values in the target's parameter order.
    ///
    /// Returns the name of the first variable the path did not capture.
    pub fn captured_vars(&self) -> Result<Vec<String>, String> {
        self.route
            .target
            .vars()
            .iter()
            .map(|var| {
                self.get_path_param(var)
                    .map(str::to_string)
                    .ok_or_else(|| var.clone())
            })
            .collect()
    }
}

/// Outcome of querying the table with a method and a path.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(RouteMatch),
    NotFound,
    /// The path exists under other methods.
    MethodNotAllowed(Vec<Method>),
}

/// Compiled routes indexed for lookup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    tree: RadixTree,
    routes: Vec<Arc<CompiledRoute>>,
}

impl RouteTable {
    /// Index `routes`; fails on malformed patterns and duplicate `(method, path)` pairs.
    pub fn new(routes: Vec<CompiledRoute>) -> Result<Self, TableError> {
        let mut tree = RadixTree::new();
        let mut indexed = Vec::with_capacity(routes.len());

        for route in routes {
            let pattern = PathPattern::parse(&route.path).map_err(|source| TableError::Pattern {
                path: route.path.clone(),
                source,
            })?;
            let route = Arc::new(route);
            tree.insert(&pattern, route.method.into(), Arc::clone(&route))
                .map_err(|e| match e {
                    InsertError::Duplicate => TableError::Duplicate {
                        method: route.method.to_string(),
                        path: route.path.clone(),
                    },
                    InsertError::Constraint(reason) => TableError::Pattern {
                        path: route.path.clone(),
                        source: PatternError::InvalidConstraint {
                            pattern: route.path.clone(),
                            name: String::new(),
                            reason,
                        },
                    },
                })?;
            indexed.push(route);
        }

        let summary: Vec<String> = indexed
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        debug!(
            routes_count = indexed.len(),
            routes_summary = ?summary,
            "Routing table loaded"
        );

        Ok(Self {
            tree,
            routes: indexed,
        })
    }

    #[must_use]
    pub fn routes(&self) -> &[Arc<CompiledRoute>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match `path` (without query string) under `method`.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let start = Instant::now();
        let segments = path_segments(path);
        let mut params = ParamVec::new();

        let outcome = match self.tree.search(method, &segments, &mut params) {
            Some(route) => Lookup::Found(RouteMatch {
                route,
                path_params: params,
            }),
            None => {
                let allowed = self.tree.allowed_methods(&segments);
                if allowed.is_empty() {
                    Lookup::NotFound
                } else {
                    Lookup::MethodNotAllowed(allowed)
                }
            }
        };

        let duration_us = start.elapsed().as_micros();
        match &outcome {
            Lookup::Found(m) if start.elapsed() > Duration::from_millis(1) => warn!(
                method = %method,
                path = %path,
                route_pattern = %m.route.path,
                duration_us,
                "Slow route matching detected"
            ),
            Lookup::Found(m) => debug!(
                method = %method,
                path = %path,
                route_pattern = %m.route.path,
                path_params = ?m.path_params,
                duration_us,
                "Route matched"
            ),
            Lookup::NotFound => debug!(method = %method, path = %path, "No route matched"),
            Lookup::MethodNotAllowed(allowed) => debug!(
                method = %method,
                path = %path,
                allowed = ?allowed,
                "Method not allowed"
            ),
        }
        outcome
    }
}

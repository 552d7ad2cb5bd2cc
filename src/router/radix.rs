//! Radix tree for segment-wise route matching.
//!
//! Each node stands for one path segment. Literal children are tried before
//! capture children, and capture children in the order they were first
//! registered; a failed branch backtracks so a later capture can still match.
//! Routes live on terminal nodes as `(method, route)` pairs in registration
//! order.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut tree = RadixTree::new();
//! tree.insert(&PathPattern::parse("/users/{id}")?, Method::GET, route)?;
//!
//! let mut params = ParamVec::new();
//! let found = tree.search(&Method::GET, &path_segments("/users/123"), &mut params);
//! ```

use std::sync::Arc;

use http::Method;
use regex::Regex;

use super::pattern::{compile_constraint, PathPattern, Segment};
use crate::compiler::CompiledRoute;
use crate::message::ParamVec;

/// Matcher for a capture segment.
#[derive(Debug, Clone)]
struct Capture {
    name: Arc<str>,
    constraint: Option<String>,
    regex: Option<Regex>,
}

impl Capture {
    fn matches(&self, segment: &str) -> bool {
        self.regex.as_ref().map_or(true, |re| re.is_match(segment))
    }
}

#[derive(Debug, Clone, Default)]
struct RadixNode {
    /// Literal text of this node; empty for capture nodes and the root.
    segment: String,
    capture: Option<Capture>,
    routes: Vec<(Method, Arc<CompiledRoute>)>,
    children: Vec<RadixNode>,
    capture_children: Vec<RadixNode>,
}

impl RadixNode {
    fn literal(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            ..Self::default()
        }
    }

    fn insert(
        &mut self,
        segments: &[Segment],
        method: Method,
        route: Arc<CompiledRoute>,
    ) -> Result<(), InsertError> {
        let Some((segment, remaining)) = segments.split_first() else {
            if self.routes.iter().any(|(m, _)| *m == method) {
                return Err(InsertError::Duplicate);
            }
            self.routes.push((method, route));
            return Ok(());
        };

        match segment {
            Segment::Literal(text) => {
                let idx = match self.children.iter().position(|c| &c.segment == text) {
                    Some(idx) => idx,
                    None => {
                        self.children.push(RadixNode::literal(text));
                        self.children.len() - 1
                    }
                };
                self.children[idx].insert(remaining, method, route)
            }
            Segment::Capture { name, constraint } => {
                let existing = self.capture_children.iter().position(|c| {
                    c.capture
                        .as_ref()
                        .is_some_and(|cap| {
                            cap.name.as_ref() == name && &cap.constraint == constraint
                        })
                });
                let idx = match existing {
                    Some(idx) => idx,
                    None => {
                        let regex = constraint
                            .as_deref()
                            .map(compile_constraint)
                            .transpose()
                            .map_err(|e| InsertError::Constraint(e.to_string()))?;
                        self.capture_children.push(RadixNode {
                            capture: Some(Capture {
                                name: Arc::from(name.as_str()),
                                constraint: constraint.clone(),
                                regex,
                            }),
                            ..RadixNode::default()
                        });
                        self.capture_children.len() - 1
                    }
                };
                self.capture_children[idx].insert(remaining, method, route)
            }
        }
    }

    fn search(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
    ) -> Option<Arc<CompiledRoute>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self
                .routes
                .iter()
                .find(|(m, _)| m == method)
                .map(|(_, route)| Arc::clone(route));
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(route) = child.search(remaining, method, params) {
                    return Some(route);
                }
            }
        }

        for child in &self.capture_children {
            let Some(capture) = &child.capture else { continue };
            if !capture.matches(segment) {
                continue;
            }
            params.push((Arc::clone(&capture.name), decode(segment)));
            if let Some(route) = child.search(remaining, method, params) {
                return Some(route);
            }
            params.pop();
        }

        None
    }

    /// Collect every method registered on any branch matching `segments`.
    fn collect_methods(&self, segments: &[&str], allowed: &mut Vec<Method>) {
        let Some((segment, remaining)) = segments.split_first() else {
            for (method, _) in &self.routes {
                if !allowed.contains(method) {
                    allowed.push(method.clone());
                }
            }
            return;
        };

        for child in &self.children {
            if child.segment == *segment {
                child.collect_methods(remaining, allowed);
            }
        }
        for child in &self.capture_children {
            if child.capture.as_ref().is_some_and(|c| c.matches(segment)) {
                child.collect_methods(remaining, allowed);
            }
        }
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Split a request path into non-empty segments.
pub(crate) fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[derive(Debug)]
pub(crate) enum InsertError {
    Duplicate,
    Constraint(String),
}

/// Radix tree keyed by path segments.
#[derive(Debug, Clone, Default)]
pub(crate) struct RadixTree {
    root: RadixNode,
}

impl RadixTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &mut self,
        pattern: &PathPattern,
        method: Method,
        route: Arc<CompiledRoute>,
    ) -> Result<(), InsertError> {
        self.root.insert(pattern.segments(), method, route)
    }

    pub(crate) fn search(
        &self,
        method: &Method,
        segments: &[&str],
        params: &mut ParamVec,
    ) -> Option<Arc<CompiledRoute>> {
        self.root.search(segments, method, params)
    }

    pub(crate) fn allowed_methods(&self, segments: &[&str]) -> Vec<Method> {
        let mut allowed = Vec::new();
        self.root.collect_methods(segments, &mut allowed);
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::DispatchTarget;
    use crate::declaration::HttpMethod;

    fn route(method: HttpMethod, path: &str, handler: &str) -> Arc<CompiledRoute> {
        Arc::new(CompiledRoute {
            method,
            path: path.to_string(),
            target: DispatchTarget::Function {
                name: handler.to_string(),
                vars: Vec::new(),
            },
            middlewares: Vec::new(),
        })
    }

    fn tree(routes: &[(HttpMethod, &str, &str)]) -> RadixTree {
        let mut tree = RadixTree::new();
        for (method, path, handler) in routes {
            let pattern = PathPattern::parse(path).unwrap();
            tree.insert(&pattern, (*method).into(), route(*method, path, handler))
                .unwrap();
        }
        tree
    }

    fn find(tree: &RadixTree, method: Method, path: &str) -> Option<(String, ParamVec)> {
        let mut params = ParamVec::new();
        tree.search(&method, &path_segments(path), &mut params).map(|r| match &r.target {
            DispatchTarget::Function { name, .. } => (name.clone(), params),
            DispatchTarget::Controller { method, .. } => (method.clone(), params),
        })
    }

    #[test]
    fn test_simple_route() {
        let t = tree(&[(HttpMethod::Get, "/health", "health_check")]);
        let (name, params) = find(&t, Method::GET, "/health").unwrap();
        assert_eq!(name, "health_check");
        assert!(params.is_empty());
    }

    #[test]
    fn test_multiple_parameters_in_order() {
        let t = tree(&[(HttpMethod::Get, "/users/{user_id}/posts/{post_id}", "get_post")]);
        let (_, params) = find(&t, Method::GET, "/users/123/posts/456").unwrap();
        let names: Vec<&str> = params.iter().map(|(k, _)| k.as_ref()).collect();
        assert_eq!(names, vec!["user_id", "post_id"]);
        assert_eq!(params[0].1, "123");
        assert_eq!(params[1].1, "456");
    }

    #[test]
    fn test_literal_preferred_over_capture() {
        let t = tree(&[
            (HttpMethod::Get, "/users/{id}", "get_user"),
            (HttpMethod::Get, "/users/me", "get_me"),
        ]);
        assert_eq!(find(&t, Method::GET, "/users/me").unwrap().0, "get_me");
        assert_eq!(find(&t, Method::GET, "/users/7").unwrap().0, "get_user");
    }

    #[test]
    fn test_constraint_and_backtracking() {
        let t = tree(&[
            (HttpMethod::Get, r"/items/{id:\d+}", "by_id"),
            (HttpMethod::Get, "/items/{slug}", "by_slug"),
            (HttpMethod::Get, "/items/special/edit", "edit_special"),
        ]);
        assert_eq!(find(&t, Method::GET, "/items/42").unwrap().0, "by_id");
        assert_eq!(find(&t, Method::GET, "/items/abc").unwrap().0, "by_slug");
        // literal branch fails at depth 2, capture branch takes over
        assert_eq!(find(&t, Method::GET, "/items/special").unwrap().0, "by_slug");
        assert_eq!(find(&t, Method::GET, "/items/special/edit").unwrap().0, "edit_special");
    }

    #[test]
    fn test_first_registered_capture_wins() {
        let t = tree(&[
            (HttpMethod::Get, "/a/{first}", "first"),
            (HttpMethod::Get, "/a/{second}", "second"),
        ]);
        assert_eq!(find(&t, Method::GET, "/a/x").unwrap().0, "first");
    }

    #[test]
    fn test_percent_decoded_values() {
        let t = tree(&[(HttpMethod::Get, "/files/{name}", "file")]);
        let (_, params) = find(&t, Method::GET, "/files/a%20b.txt").unwrap();
        assert_eq!(params[0].1, "a b.txt");
    }

    #[test]
    fn test_root_and_trailing_slash() {
        let t = tree(&[(HttpMethod::Post, "", "root"), (HttpMethod::Get, "/list", "list")]);
        assert_eq!(find(&t, Method::POST, "").unwrap().0, "root");
        assert_eq!(find(&t, Method::POST, "/").unwrap().0, "root");
        assert_eq!(find(&t, Method::GET, "/list/").unwrap().0, "list");
    }

    #[test]
    fn test_allowed_methods_union_without_duplicates() {
        let t = tree(&[
            (HttpMethod::Get, "/items/{id}", "get"),
            (HttpMethod::Delete, "/items/{id}", "delete"),
            (HttpMethod::Put, "/items/special", "put_special"),
            (HttpMethod::Get, "/items/special", "get_special"),
        ]);
        let allowed = t.allowed_methods(&path_segments("/items/special"));
        assert_eq!(allowed, vec![Method::PUT, Method::GET, Method::DELETE]);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut t = tree(&[(HttpMethod::Get, "/x", "a")]);
        let pattern = PathPattern::parse("/x").unwrap();
        let err = t.insert(&pattern, Method::GET, route(HttpMethod::Get, "/x", "b"));
        assert!(matches!(err, Err(InsertError::Duplicate)));
    }
}

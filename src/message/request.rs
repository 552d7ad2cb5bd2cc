use std::sync::Arc;

use http::Method;
use serde_json::Value;

use super::{find_header, replace_header, HeaderVec, ParamVec};

/// An incoming request as seen by middlewares and handlers.
///
/// `path_params` is empty until the route table has matched the request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    pub path_params: ParamVec,
    pub body: Vec<u8>,
}

impl Request {
    /// Build a request from a method and a request target such as `/users/7?full=1`.
    #[must_use]
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };
        let query_params = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            path: path.to_string(),
            query_params,
            headers: HeaderVec::new(),
            path_params: ParamVec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        replace_header(&mut self.headers, name, value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a JSON body and the matching content type.
    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    /// Header lookup is case-insensitive.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Last occurrence wins for repeated query parameters.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }

    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

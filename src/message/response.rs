use serde_json::Value;

use super::{find_header, replace_header, HeaderVec};

/// A response produced by a handler, a middleware, or the dispatcher itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl Response {
    /// An empty response with the given status.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    /// A JSON error body of the form `{"error": message}`.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body(body.into())
    }

    #[must_use]
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header("content-type", "text/html")
            .with_body(body.into())
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add or replace a header (names compare case-insensitively).
    pub fn set_header(&mut self, name: &str, value: String) {
        replace_header(&mut self.headers, name, value);
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Parse the body as JSON; `None` when it is not valid JSON.
    #[must_use]
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let resp = Response::error(500, "boom");
        assert_eq!(resp.status, 500);
        assert_eq!(resp.get_header("Content-Type"), Some("application/json"));
        assert_eq!(resp.body_json(), Some(serde_json::json!({"error": "boom"})));
    }

    #[test]
    fn test_set_header_replaces_existing() {
        let mut resp = Response::new(204).with_header("X-Test", "a");
        resp.set_header("x-test", "b".to_string());
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.get_header("X-TEST"), Some("b"));
    }
}

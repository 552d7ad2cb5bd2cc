use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::message::Request;

/// Parse the request body according to its content type.
///
/// JSON bodies become the decoded value, form bodies an object of strings.
/// Any other content type, or an empty body, yields `None`.
pub fn parse_body(req: &Request) -> Result<Option<Value>> {
    if req.body.is_empty() {
        return Ok(None);
    }
    let Some(content_type) = req.content_type() else {
        return Ok(None);
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/json" => serde_json::from_slice(&req.body)
            .map(Some)
            .map_err(|e| Error::Body(e.to_string())),
        "application/x-www-form-urlencoded" => {
            let fields: Map<String, Value> = url::form_urlencoded::parse(&req.body)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            Ok(Some(Value::Object(fields)))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    #[test]
    fn test_json_body() {
        let req = Request::new(Method::POST, "/").with_json(&json!({"name": "a"}));
        assert_eq!(parse_body(&req).unwrap(), Some(json!({"name": "a"})));
    }

    #[test]
    fn test_json_with_charset() {
        let req = Request::new(Method::POST, "/")
            .with_header("Content-Type", "application/json; charset=utf-8")
            .with_body("[1,2]");
        assert_eq!(parse_body(&req).unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn test_malformed_json_is_body_error() {
        let req = Request::new(Method::POST, "/")
            .with_header("Content-Type", "application/json")
            .with_body("{nope");
        assert!(matches!(parse_body(&req), Err(Error::Body(_))));
    }

    #[test]
    fn test_form_body() {
        let req = Request::new(Method::POST, "/")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body("a=1&b=x+y");
        assert_eq!(parse_body(&req).unwrap(), Some(json!({"a": "1", "b": "x y"})));
    }

    #[test]
    fn test_other_types_are_ignored() {
        let req = Request::new(Method::POST, "/")
            .with_header("Content-Type", "text/plain")
            .with_body("hi");
        assert_eq!(parse_body(&req).unwrap(), None);
    }
}

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::core::{AcceptsContext, ControllerContext};
use crate::message::{Request, Response};
use crate::template::TemplateError;

/// Request context plus response helpers for controllers.
///
/// Embed it in a controller and name the field in
/// `#[controller("...", context = field)]` to receive the context.
#[derive(Debug, Clone, Default)]
pub struct ControllerBase {
    context: Option<ControllerContext>,
}

impl AcceptsContext for ControllerBase {
    fn set_request_context(&mut self, context: ControllerContext) {
        self.context = Some(context);
    }
}

impl ControllerBase {
    #[must_use]
    pub fn context(&self) -> Option<&ControllerContext> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        self.context.as_ref().map(|c| &c.request)
    }

    /// The parsed request body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.context.as_ref().and_then(|c| c.body.as_ref())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request().and_then(|r| r.get_header(name))
    }

    /// A query parameter, or `default` when absent.
    #[must_use]
    pub fn query_parameter(&self, name: &str, default: &str) -> String {
        self.request()
            .and_then(|r| r.get_query_param(name))
            .unwrap_or(default)
            .to_string()
    }

    /// Render `template` as an HTML response.
    pub fn render(
        &self,
        template: &str,
        data: &Value,
        status: u16,
    ) -> Result<Response, TemplateError> {
        let engine = self
            .context
            .as_ref()
            .and_then(|c| c.engine.as_ref())
            .ok_or(TemplateError::NoEngine)?;
        Ok(Response::html(status, engine.render(template, data)?))
    }

    #[must_use]
    pub fn json(&self, data: &Value, status: u16) -> Response {
        Response::json(status, data)
    }

    /// Serve a file from disk; 404 when it cannot be read.
    pub fn file(&self, path: impl AsRef<Path>, status: u16) -> Response {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => Response::new(status)
                .with_header("content-type", content_type(path))
                .with_body(bytes),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "File not readable");
                Response::new(404)
            }
        }
    }

    #[must_use]
    pub fn redirect(&self, location: &str, status: u16) -> Response {
        Response::new(status).with_header("location", location)
    }

    #[must_use]
    pub fn no_content(&self) -> Response {
        Response::new(204)
    }

    #[must_use]
    pub fn not_found(&self, data: Option<&Value>) -> Response {
        match data {
            Some(data) => Response::json(404, data),
            None => Response::new(404),
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

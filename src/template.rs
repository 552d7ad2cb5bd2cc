//! Template rendering used by controller helpers.

use std::path::Path;

use minijinja::Environment;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no template engine is configured")]
    NoEngine,

    #[error("template `{template}` failed to render: {source}")]
    Render {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Renders a named template with JSON data.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, data: &Value) -> Result<String, TemplateError>;
}

/// [`TemplateEngine`] backed by `minijinja`.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Load templates lazily from `dir`; template names are paths relative to it.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir.as_ref()));
        Self { env }
    }

    /// Build an engine from in-memory `(name, source)` pairs.
    pub fn from_templates<I, N, S>(templates: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut env = Environment::new();
        for (name, source) in templates {
            let name = name.into();
            env.add_template_owned(name.clone(), source.into())
                .map_err(|source| TemplateError::Render {
                    template: name,
                    source,
                })?;
        }
        Ok(Self { env })
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        let to_error = |source| TemplateError::Render {
            template: template.to_string(),
            source,
        };
        self.env
            .get_template(template)
            .map_err(to_error)?
            .render(data)
            .map_err(to_error)
    }
}

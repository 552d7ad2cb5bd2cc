use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::artifact;
use super::route::{CompiledRoute, DispatchTarget};
use crate::declaration::{ControllerDeclaration, HttpMethod};
use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::middleware::resolve;
use crate::registry::Registry;
use crate::router::{join_path, PathPattern};
use crate::scanner::{scan_directory, QualifiedName};

/// Compile controller declarations into routes, in declaration order.
///
/// Fails on the first malformed pattern, handler parameter missing from the
/// path, rejected middleware arguments or duplicate `(method, path)` pair.
pub fn compile_controllers(
    declarations: &[ControllerDeclaration],
    registry: &Registry,
) -> Result<Vec<CompiledRoute>> {
    let mut routes = Vec::new();
    let mut seen: HashSet<(HttpMethod, String)> = HashSet::new();

    for controller in declarations {
        for route in &controller.routes {
            let path = join_path(&controller.base_path, &route.path);
            let pattern = PathPattern::parse(&path).map_err(|e| {
                Error::compilation(format!("{}::{}: {e}", controller.type_name, route.handler))
            })?;

            let captures: HashSet<&str> = pattern.captures().collect();
            if let Some(missing) = route.params.iter().find(|p| !captures.contains(p.as_str())) {
                return Err(Error::compilation(format!(
                    "{}::{} takes `{missing}` but `{path}` does not capture it",
                    controller.type_name, route.handler
                )));
            }

            if !seen.insert((route.method, path.clone())) {
                return Err(Error::compilation(format!(
                    "{} {path} is declared more than once (last by {}::{})",
                    route.method, controller.type_name, route.handler
                )));
            }

            let middlewares = resolve(&controller.middlewares, &route.middlewares, registry)?;
            routes.push(CompiledRoute {
                method: route.method,
                path,
                target: DispatchTarget::Controller {
                    type_name: controller.type_name.clone(),
                    method: route.handler.clone(),
                    vars: route.params.clone(),
                },
                middlewares,
            });
        }
        debug!(
            controller = %controller.type_name,
            base_path = %controller.base_path,
            routes = controller.routes.len(),
            "Controller compiled"
        );
    }
    Ok(routes)
}

/// Produces the artifact text for a controller directory.
pub struct TableCompiler {
    registry: Arc<Registry>,
    extensions: Vec<Arc<dyn Extension>>,
}

impl TableCompiler {
    #[must_use]
    pub fn new(registry: Arc<Registry>, extensions: Vec<Arc<dyn Extension>>) -> Self {
        Self {
            registry,
            extensions,
        }
    }

    /// Scan `controller_dir` and return the declarations of every registered controller in it.
    ///
    /// Extensions see all discovered names, controllers or not.
    pub fn discover(&self, controller_dir: &Path) -> Result<Vec<ControllerDeclaration>> {
        let names = scan_directory(controller_dir)?;
        for extension in &self.extensions {
            extension.before_generation(&names);
        }

        let mut declarations = Vec::new();
        for name in &names {
            match self.registry.controller_for(name)? {
                Some(controller) => declarations.push((controller.declaration)()),
                None => debug!(type_name = %name, "Not a registered controller, skipping"),
            }
        }
        Ok(declarations)
    }

    /// Build the complete artifact text for `controller_dir`.
    pub fn compile(&self, controller_dir: &Path) -> Result<String> {
        let start = Instant::now();
        let declarations = self.discover(controller_dir)?;
        let routes = compile_controllers(&declarations, &self.registry)?;

        let mut text = artifact::render(&routes)?;
        for extension in &self.extensions {
            let extra = extension.additional_routes();
            if !extra.is_empty() {
                text.push_str(&extra);
                text.push('\n');
            }
        }
        let text = self
            .extensions
            .iter()
            .fold(text, |text, extension| extension.after_generation(text));

        info!(
            controller_dir = %controller_dir.display(),
            controllers = declarations.len(),
            routes = routes.len(),
            extensions = self.extensions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Route table compiled"
        );
        Ok(text)
    }

    /// Type names the registry would resolve in `controller_dir`.
    pub fn controller_names(&self, controller_dir: &Path) -> Result<Vec<QualifiedName>> {
        let mut found = Vec::new();
        for name in scan_directory(controller_dir)? {
            if self.registry.controller_for(&name)?.is_some() {
                found.push(name);
            }
        }
        Ok(found)
    }
}

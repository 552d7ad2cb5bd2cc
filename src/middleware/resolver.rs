use tracing::{debug, warn};

use super::core::Pipeline;
use crate::declaration::MiddlewareDeclaration;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// Combine class-level and method-level declarations for one route.
///
/// Class-level declarations come first; declaration order is kept within each
/// level. Declarations naming an unregistered middleware type are dropped.
/// Every kept declaration is constructed once so that bad arguments fail the
/// build instead of the first request.
pub fn resolve(
    class_level: &[MiddlewareDeclaration],
    method_level: &[MiddlewareDeclaration],
    registry: &Registry,
) -> Result<Vec<MiddlewareDeclaration>> {
    let mut resolved = Vec::with_capacity(class_level.len() + method_level.len());
    for decl in class_level.iter().chain(method_level) {
        let Some(factory) = registry.middleware_factory(&decl.type_name) else {
            debug!(middleware = %decl.type_name, "Dropping unregistered middleware");
            continue;
        };
        factory(&decl.args).map_err(|e| Error::compilation(e.to_string()))?;
        resolved.push(decl.clone());
    }
    Ok(resolved)
}

/// Build the per-request pipeline for already resolved declarations.
pub fn instantiate(
    declarations: &[MiddlewareDeclaration],
    registry: &Registry,
) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new();
    for decl in declarations {
        match registry.middleware_factory(&decl.type_name) {
            Some(factory) => pipeline.push(factory(&decl.args)?),
            None => {
                warn!(middleware = %decl.type_name, "Middleware no longer registered, skipping");
            }
        }
    }
    Ok(pipeline)
}

//! Hooks that let applications take part in route table generation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::scanner::QualifiedName;

/// Generation hooks, called in registration order.
///
/// Every method has a no-op default, so an extension implements only what it
/// needs. `&self` receivers keep extensions shareable; use interior
/// mutability for state recorded during a build.
pub trait Extension: Send + Sync {
    /// Called with every discovered type name before routes are compiled.
    fn before_generation(&self, _types: &[QualifiedName]) {}

    /// Transform the fully serialized table; outputs chain from one extension to the next.
    fn after_generation(&self, table: String) -> String {
        table
    }

    /// Raw artifact lines appended verbatim after the compiled routes.
    ///
    /// [`CompiledRoute::to_line`](crate::compiler::CompiledRoute::to_line)
    /// produces lines in the expected format.
    fn additional_routes(&self) -> String {
        String::new()
    }

    /// Whether the cached table must be rebuilt even though it exists.
    fn recreate_cache(&self) -> bool {
        false
    }
}

/// Requests a rebuild whenever a controller source file is newer than the artifact.
#[derive(Debug, Clone)]
pub struct StaleSourcesExtension {
    controller_dir: PathBuf,
    artifact: PathBuf,
}

impl StaleSourcesExtension {
    #[must_use]
    pub fn new(controller_dir: impl Into<PathBuf>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            controller_dir: controller_dir.into(),
            artifact: artifact.into(),
        }
    }

    fn newest_source(&self) -> Option<SystemTime> {
        fs::read_dir(&self.controller_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
            .filter_map(|path| modified(&path))
            .max()
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl Extension for StaleSourcesExtension {
    fn recreate_cache(&self) -> bool {
        let Some(artifact) = modified(&self.artifact) else {
            return true;
        };
        let stale = self.newest_source().is_some_and(|newest| newest > artifact);
        if stale {
            debug!(
                controller_dir = %self.controller_dir.display(),
                "Controller sources changed since last build"
            );
        }
        stale
    }
}

//! On-disk route table cache.
//!
//! The cache owns `<cache_dir>/routing/route-table.jsonl`. It is rebuilt when
//! it is missing, when a rebuild is forced, or when any extension reports it
//! stale; otherwise the existing file is left untouched. Writers assume a
//! single builder at a time: the new table goes to a sibling temp file which
//! is then renamed over the artifact.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::compiler::{self, TableCompiler};
use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::registry::Registry;
use crate::router::RouteTable;

pub const ROUTING_DIR: &str = "routing";
pub const ARTIFACT_NAME: &str = "route-table.jsonl";

/// Location of the artifact under `cache_dir`.
#[must_use]
pub fn artifact_path(cache_dir: impl AsRef<Path>) -> PathBuf {
    cache_dir.as_ref().join(ROUTING_DIR).join(ARTIFACT_NAME)
}

pub struct RouteCache {
    artifact: PathBuf,
    controller_dir: PathBuf,
    compiler: TableCompiler,
    extensions: Vec<Arc<dyn Extension>>,
}

impl RouteCache {
    /// Prepare the cache directory tree; failing to create it is a configuration error.
    pub fn new(
        cache_dir: impl AsRef<Path>,
        controller_dir: impl Into<PathBuf>,
        registry: Arc<Registry>,
        extensions: Vec<Arc<dyn Extension>>,
    ) -> Result<Self> {
        let routing_dir = cache_dir.as_ref().join(ROUTING_DIR);
        fs::create_dir_all(&routing_dir).map_err(|source| Error::Configuration {
            path: routing_dir.clone(),
            source,
        })?;
        Ok(Self {
            artifact: routing_dir.join(ARTIFACT_NAME),
            controller_dir: controller_dir.into(),
            compiler: TableCompiler::new(registry, extensions.clone()),
            extensions,
        })
    }

    #[must_use]
    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    #[must_use]
    pub fn controller_dir(&self) -> &Path {
        &self.controller_dir
    }

    /// Whether [`ensure`](Self::ensure) would rebuild.
    #[must_use]
    pub fn needs_rebuild(&self, force: bool) -> bool {
        if force {
            return true;
        }
        if !self.artifact.exists() {
            return true;
        }
        self.extensions.iter().any(|ext| ext.recreate_cache())
    }

    /// Rebuild when needed; returns whether a rebuild happened.
    pub fn ensure(&self, force: bool) -> Result<bool> {
        if !self.needs_rebuild(force) {
            debug!(artifact = %self.artifact.display(), "Route table cache is current");
            return Ok(false);
        }
        self.rebuild()?;
        Ok(true)
    }

    /// Compile the controller directory and replace the artifact.
    ///
    /// The text is checked to load as a valid table before it is written, so a
    /// failed build never leaves a broken artifact behind.
    pub fn rebuild(&self) -> Result<()> {
        let text = self.compiler.compile(&self.controller_dir)?;
        let routes = compiler::parse(&text).map_err(|e| {
            Error::compilation(format!("generated table line {}: {}", e.line, e.reason))
        })?;
        let count = routes.len();
        RouteTable::new(routes).map_err(|e| Error::compilation(e.to_string()))?;

        let tmp = self.artifact.with_extension("jsonl.tmp");
        let io = |source| Error::CacheIo {
            path: self.artifact.clone(),
            source,
        };
        fs::write(&tmp, text.as_bytes()).map_err(io)?;
        fs::rename(&tmp, &self.artifact).map_err(io)?;

        info!(
            artifact = %self.artifact.display(),
            routes = count,
            bytes = text.len(),
            "Route table cache written"
        );
        Ok(())
    }

    /// Read the artifact back into a queryable table.
    pub fn load(&self) -> Result<RouteTable> {
        let text = fs::read_to_string(&self.artifact).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                Error::CacheMissing(self.artifact.clone())
            } else {
                Error::CacheIo {
                    path: self.artifact.clone(),
                    source,
                }
            }
        })?;
        let routes = compiler::parse(&text).map_err(|e| Error::MalformedCache {
            path: self.artifact.clone(),
            line: e.line,
            reason: e.reason,
        })?;
        RouteTable::new(routes).map_err(|e| Error::MalformedCache {
            path: self.artifact.clone(),
            line: 0,
            reason: e.to_string(),
        })
    }
}

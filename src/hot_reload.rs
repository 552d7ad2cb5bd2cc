//! # Hot Reload Module
//!
//! Watches the controller directory and swaps in a freshly built route table
//! whenever a source file is created, modified or removed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arc_swap::ArcSwap;
//! use routeforge::hot_reload::watch_controllers;
//!
//! let table = Arc::new(ArcSwap::from_pointee(cache.load()?));
//! let _watcher = watch_controllers("src/controllers", cache.clone(), table.clone())?;
//!
//! // Each request reads the current table.
//! dispatcher.dispatch_with_table(&table.load(), request)?;
//! ```
//!
//! ## Error Handling
//!
//! A failed rebuild is logged and the previous table stays active, so saving
//! a half-written controller never takes routing down.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info, warn};

use crate::cache::RouteCache;
use crate::router::RouteTable;

/// Watch `dir` and keep `table` in sync with its controllers.
///
/// The watcher stops when the returned value is dropped.
pub fn watch_controllers<P>(
    dir: P,
    cache: Arc<RouteCache>,
    table: Arc<ArcSwap<RouteTable>>,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
{
    let path: PathBuf = dir.as_ref().to_path_buf();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) && touches_source(&event.paths)
                {
                    reload(&cache, &table);
                }
            }
            Err(e) => warn!(error = %e, "Controller watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    info!(dir = %path.display(), "Watching controllers for changes");
    Ok(watcher)
}

fn touches_source(paths: &[PathBuf]) -> bool {
    paths.is_empty() || paths.iter().any(|p| p.extension().is_some_and(|ext| ext == "rs"))
}

/// Rebuild and swap; the previous table stays on failure.
pub fn reload(cache: &RouteCache, table: &ArcSwap<RouteTable>) {
    match cache.ensure(true).and_then(|_| cache.load()) {
        Ok(fresh) => {
            info!(routes = fresh.len(), "hot-reload: route table swapped");
            table.store(Arc::new(fresh));
        }
        Err(e) => error!(error = %e, "hot-reload: rebuild failed, keeping previous table"),
    }
}

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use clap::{Args, Parser, Subcommand};
use http::Method;
use tracing::info;

use crate::cache::RouteCache;
use crate::compiler::TableCompiler;
use crate::config::RouterConfig;
use crate::extension::{Extension, StaleSourcesExtension};
use crate::hot_reload::watch_controllers;
use crate::logging::{init_logging, LogConfig};
use crate::registry::Registry;
use crate::router::{Lookup, RouteTable};

/// Command-line interface for routeforge
#[derive(Parser, Debug)]
#[command(
    name = "routeforge",
    version,
    about = "Route table compiler and inspector",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the controllers and the cache live.
///
/// Precedence: command-line flag, then environment, then config file, then defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Router configuration file (TOML or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the routing cache
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Directory scanned for controllers
    #[arg(long, global = true)]
    pub controller_dir: Option<PathBuf>,

    /// Rebuild when controller sources are newer than the cached table
    #[arg(long, global = true, default_value_t = false)]
    pub stale_check: bool,
}

impl PathArgs {
    pub fn resolve(&self) -> Result<RouterConfig> {
        let mut config = match &self.config {
            Some(path) => RouterConfig::load(path)?,
            None => RouterConfig::default(),
        };
        config.apply_env()?;
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.controller_dir {
            config.controller_dir = dir.clone();
        }
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Force a rebuild of the route table, then keep watching when `watch` is configured
    Build,
    /// List the controller types found in the controller directory
    Scan {
        /// Also list files whose type is not a registered controller
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Print every route of the cached table
    Inspect,
    /// Show how the cached table answers a request
    Match {
        /// HTTP method, e.g. GET
        method: String,
        /// Request path, e.g. /api/user/42
        path: String,
    },
    /// Rebuild the table whenever a controller file changes
    Watch,
}

/// Parse arguments, set up logging and run against the global registry.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&LogConfig::from_env())?;
    run_with(cli, Registry::global())
}

/// Run a parsed command against `registry`, writing results to stdout.
pub fn run_with(cli: Cli, registry: Arc<Registry>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, registry, &mut out)
}

pub(crate) fn execute<W: Write>(cli: &Cli, registry: Arc<Registry>, out: &mut W) -> Result<()> {
    let config = cli.paths.resolve()?;
    let build_cache = |registry: Arc<Registry>| -> Result<RouteCache> {
        let mut extensions: Vec<Arc<dyn Extension>> = Vec::new();
        if cli.paths.stale_check {
            extensions.push(Arc::new(StaleSourcesExtension::new(
                &config.controller_dir,
                crate::cache::artifact_path(&config.cache_dir),
            )));
        }
        RouteCache::new(&config.cache_dir, &config.controller_dir, registry, extensions)
            .context("Failed to open routing cache")
    };

    match &cli.command {
        Commands::Build => {
            let cache = build_cache(registry)?;
            cache.ensure(true).context("Route table build failed")?;
            let table = cache.load()?;
            writeln!(
                out,
                "built {} route(s) into {}",
                table.len(),
                cache.artifact_path().display()
            )?;
            if config.watch {
                watch_forever(&config, Arc::new(cache), table, out)?;
            }
        }
        Commands::Scan { all } => {
            let names = if *all {
                crate::scanner::scan_directory(&config.controller_dir)?
            } else {
                TableCompiler::new(registry, Vec::new()).controller_names(&config.controller_dir)?
            };
            for name in names {
                writeln!(out, "{name}")?;
            }
        }
        Commands::Inspect => {
            let cache = build_cache(registry)?;
            cache.ensure(false)?;
            for route in cache.load()?.routes() {
                writeln!(out, "{route}")?;
            }
        }
        Commands::Match { method, path } => {
            let method: Method = method
                .to_ascii_uppercase()
                .parse()
                .with_context(|| format!("Invalid HTTP method: {method}"))?;
            let cache = build_cache(registry)?;
            cache.ensure(false)?;
            let table = cache.load()?;
            match table.lookup(&method, path) {
                Lookup::Found(matched) => {
                    writeln!(out, "matched {}", matched.route)?;
                    for (name, value) in &matched.path_params {
                        writeln!(out, "  {name} = {value}")?;
                    }
                }
                Lookup::NotFound => writeln!(out, "not found")?,
                Lookup::MethodNotAllowed(allowed) => {
                    let allowed: Vec<&str> = allowed.iter().map(Method::as_str).collect();
                    writeln!(out, "method not allowed; Allow: {}", allowed.join(", "))?;
                }
            }
        }
        Commands::Watch => {
            let cache = build_cache(registry)?;
            cache.ensure(false)?;
            let table = cache.load()?;
            watch_forever(&config, Arc::new(cache), table, out)?;
        }
    }
    Ok(())
}

/// Keep `table` in sync with the controller directory until the process exits.
fn watch_forever<W: Write>(
    config: &RouterConfig,
    cache: Arc<RouteCache>,
    table: RouteTable,
    out: &mut W,
) -> Result<()> {
    let table = Arc::new(ArcSwap::from_pointee(table));
    let _watcher = watch_controllers(&config.controller_dir, cache, table)
        .context("Failed to watch controller directory")?;
    writeln!(out, "watching {}", config.controller_dir.display())?;
    out.flush()?;
    info!(controller_dir = %config.controller_dir.display(), "Watch mode started");
    loop {
        std::thread::park();
    }
}

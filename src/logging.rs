//! Structured logging setup.
//!
//! Configuration comes from the environment:
//!
//! - `ROUTEFORGE_LOG_LEVEL`: trace/debug/info/warn/error (default `info`),
//!   overridden by `RUST_LOG` when set
//! - `ROUTEFORGE_LOG_FORMAT`: `json` (default) or `pretty`
//! - `ROUTEFORGE_LOG_ASYNC`: buffer output on a background thread (default `false`)
//! - `ROUTEFORGE_LOG_TARGET_FILTER`: extra comma-separated filter directives
//! - `ROUTEFORGE_LOG_LOCATION`: include file and line in each event (default `false`)
//!
//! Logs go to stderr so command output on stdout stays machine readable.

use std::env;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub async_logging: bool,
    /// Extra filter directives, comma-separated.
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: false,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var("ROUTEFORGE_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: env::var("ROUTEFORGE_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            async_logging: env::var("ROUTEFORGE_LOG_ASYNC")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.async_logging),
            target_filter: env::var("ROUTEFORGE_LOG_TARGET_FILTER").ok(),
            include_location: env::var("ROUTEFORGE_LOG_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let level = parse_level(&config.log_level);
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if let Some(target_filter) = &config.target_filter {
        for directive in target_filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
            }
        }
    }
    filter
}

/// Install the global subscriber.
///
/// With async logging the returned guard flushes buffered output on drop;
/// keep it alive for the lifetime of the process.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(guard)
}

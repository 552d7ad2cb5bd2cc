//! # CLI Module
//!
//! Command-line access to the route table of a controller directory.
//!
//! ## Commands
//!
//! ```bash
//! routeforge build                  # force a rebuild of the cached table
//! routeforge scan [--all]           # list discovered controller types
//! routeforge inspect                # print every cached route
//! routeforge match GET /api/user/42 # show how a request would be routed
//! routeforge watch                  # rebuild on controller changes
//! ```
//!
//! Every command accepts `--config`, `--cache-dir`, `--controller-dir` and
//! `--stale-check`.
//!
//! ## Usage from Code
//!
//! Controllers only reach the registry when their crate is linked, so
//! applications embed the CLI in their own binary:
//!
//! ```rust,ignore
//! use clap::Parser;
//! use routeforge::cli::{run_with, Cli};
//!
//! fn main() -> anyhow::Result<()> {
//!     run_with(Cli::parse(), routeforge::Registry::global())
//! }
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, run_with, Cli, Commands, PathArgs};

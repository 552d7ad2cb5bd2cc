//! # Compiler Module
//!
//! Builds the route table artifact from the controller directory:
//!
//! 1. scan the directory for type names;
//! 2. call every extension's `before_generation` with those names;
//! 3. resolve each name against the registry and compile the declarations of
//!    every controller found (path joining, pattern and parameter checks,
//!    middleware resolution);
//! 4. render the routes as JSON Lines under a header;
//! 5. append each extension's `additional_routes` text verbatim;
//! 6. pass the text through every extension's `after_generation`, in order.
//!
//! Any failure aborts the whole build so no partial table is produced.

mod artifact;
mod compile;
mod route;

pub use artifact::{parse, render, LineError, ARTIFACT_HEADER};
pub use compile::{compile_controllers, TableCompiler};
pub use route::{CompiledRoute, DispatchTarget};

//! # Router Module
//!
//! Turns a list of [`CompiledRoute`](crate::compiler::CompiledRoute)s into a
//! [`RouteTable`] and answers `(method, path)` queries against it.
//!
//! ## Matching rules
//!
//! - Paths are compared segment by segment; empty segments are ignored, so
//!   `""`, `"/"` and trailing slashes normalize.
//! - A literal segment is preferred over a capture at the same position.
//! - Captures (`{name}` or `{name:regex}`) are tried in registration order,
//!   backtracking when a deeper segment fails.
//! - When no route matches under the request method but some route matches
//!   the path, the lookup reports `MethodNotAllowed` with every such method.
//!
//! ## Example
//!
//! ```rust,ignore
//! use routeforge::router::{Lookup, RouteTable};
//!
//! let table = RouteTable::new(routes)?;
//! match table.lookup(&http::Method::GET, "/api/user/42") {
//!     Lookup::Found(m) => println!("{} id={:?}", m.route.target, m.get_path_param("id")),
//!     Lookup::MethodNotAllowed(allowed) => println!("allowed: {allowed:?}"),
//!     Lookup::NotFound => println!("not found"),
//! }
//! ```

mod core;
mod pattern;
mod radix;

pub use core::{Lookup, RouteMatch, RouteTable, TableError};
pub use pattern::{join_path, PathPattern, PatternError, Segment};

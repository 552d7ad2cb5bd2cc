//! # routeforge
//!
//! **routeforge** is an annotation-driven HTTP routing layer. Controllers
//! declare their routes and middlewares with attributes; the declarations are
//! compiled into a route table that is cached on disk and used to dispatch
//! already parsed requests through a middleware pipeline to their handlers.
//!
//! ## Overview
//!
//! - **[`declaration`]** - Route, controller and middleware metadata
//! - **[`registry`]** - Link-time registry of controllers, middlewares and functions
//! - **[`scanner`]** - Discovery of type names in a controller directory
//! - **[`compiler`]** - Compilation of declarations into the route table artifact
//! - **[`cache`]** - On-disk artifact lifecycle (build, staleness, load)
//! - **[`router`]** - Segment radix tree answering `(method, path)` lookups
//! - **[`middleware`]** - Middleware capability, pipeline and built-ins
//! - **[`controller`]** - Controller contract, request context and response helpers
//! - **[`dispatcher`]** - Request lifecycle and the [`handle`] entry point
//! - **[`hot_reload`]** - Table rebuilds on controller changes
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Dispatcher
//!     participant Cache as RouteCache
//!     participant Table as RouteTable
//!     participant Pipeline as Middleware Pipeline
//!     participant Controller
//!
//!     Caller->>Dispatcher: dispatch(request)
//!     Dispatcher->>Cache: ensure(false)
//!     Cache-->>Dispatcher: rebuilt if missing or stale
//!     Dispatcher->>Cache: load()
//!     Cache-->>Dispatcher: RouteTable
//!     Dispatcher->>Table: lookup(method, path)
//!     alt NotFound
//!         Dispatcher-->>Caller: not-found response
//!     else MethodNotAllowed
//!         Dispatcher-->>Caller: 405 + Allow
//!     else Found
//!         Dispatcher->>Pipeline: class, then method middlewares
//!         Pipeline->>Controller: set_request_context + invoke(method, captures)
//!         Controller-->>Pipeline: Response
//!         Pipeline-->>Caller: Response
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use routeforge::{controller, ControllerBase, Request, Response};
//! use serde_json::json;
//!
//! #[derive(Default)]
//! pub struct UserController {
//!     base: ControllerBase,
//! }
//!
//! #[controller("api/user", context = base)]
//! #[middleware(SetHeader("X-Service", "users"))]
//! impl UserController {
//!     #[route(GET, "{id}")]
//!     pub fn get_user(&self, id: u64) -> Response {
//!         self.base.json(&json!({ "id": id }), 200)
//!     }
//! }
//!
//! let response = routeforge::handle(
//!     "var/cache",
//!     "src/controllers",
//!     Request::new(http::Method::GET, "/api/user/42"),
//!     Response::error(404, "Not Found"),
//!     None,
//!     vec![],
//! );
//! ```
//!
//! ## Cache Artifact
//!
//! The compiled table lives at `<cache_dir>/routing/route-table.jsonl`: a
//! comment header followed by one JSON route per line. It is rebuilt when
//! missing, when forced, or when an [`Extension`] reports it stale.

extern crate self as routeforge;

pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod controller;
pub mod declaration;
pub mod dispatcher;
pub mod error;
pub mod extension;
pub mod hot_reload;
pub mod logging;
pub mod message;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod scanner;
pub mod template;

#[doc(hidden)]
pub use inventory;
pub use routeforge_macros::controller;

pub use cache::RouteCache;
pub use compiler::{CompiledRoute, DispatchTarget};
pub use controller::{
    AcceptsContext, Controller, ControllerBase, ControllerContext, IntoHandlerResult, InvokeError,
};
pub use declaration::{
    ControllerDeclaration, HttpMethod, MiddlewareArg, MiddlewareDeclaration, RouteDeclaration,
};
pub use dispatcher::{build_routing_cache, handle, Dispatcher};
pub use error::{Error, Result};
pub use extension::{Extension, StaleSourcesExtension};
pub use message::{Request, Response};
pub use middleware::{Middleware, MiddlewareError, Next};
pub use registry::Registry;
pub use router::{Lookup, RouteTable};
pub use template::{MiniJinjaEngine, TemplateEngine, TemplateError};

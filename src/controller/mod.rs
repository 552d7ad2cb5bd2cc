//! # Controller Module
//!
//! A controller is a type whose methods handle routes. The `#[controller]`
//! attribute implements [`Controller`] for an annotated `impl` block: it
//! reports the block's routing declarations and dispatches method calls by
//! name, parsing path captures into the method's parameter types.
//!
//! Controllers that want access to the current request opt in through
//! [`AcceptsContext`], usually by embedding a [`ControllerBase`] and naming
//! it with `#[controller("base", context = field)]`. The base carries the
//! request, its parsed body and the template engine, and offers response
//! helpers (`json`, `render`, `file`, `redirect`, ...).

mod base;
mod body;
mod core;

pub use base::ControllerBase;
pub use body::parse_body;
pub use core::{
    parse_arg, AcceptsContext, Controller, ControllerContext, IntoHandlerResult, InvokeError,
};

//! Request and response values passed through the middleware pipeline.
//!
//! Both types keep headers and parameters in stack-allocated small vectors;
//! names are `Arc<str>` so that names taken from the route tree are shared
//! instead of copied per request.

mod request;
mod response;

use smallvec::SmallVec;
use std::sync::Arc;

pub use request::Request;
pub use response::Response;

/// Headers kept inline before spilling to the heap.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Path and query parameters kept inline before spilling to the heap.
pub const MAX_INLINE_PARAMS: usize = 8;

pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

pub(crate) fn find_header<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub(crate) fn replace_header(headers: &mut HeaderVec, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((Arc::from(name), value));
}

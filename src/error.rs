//! Error taxonomy shared by the scanner, compiler, cache and dispatcher.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::controller::InvokeError;
use crate::middleware::MiddlewareError;
use crate::template::TemplateError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The cache location could not be prepared.
    #[error("cannot prepare routing cache directory {path}: {source}")]
    Configuration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The controller directory is missing or unreadable.
    #[error("cannot read controller directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A declaration could not be turned into a routing table.
    #[error("route compilation failed: {0}")]
    Compilation(String),

    #[error("route table {0} does not exist")]
    CacheMissing(PathBuf),

    #[error("route table I/O failed for {path}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("route table {path} is malformed at line {line}: {reason}")]
    MalformedCache {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The handler was located but could not be called with the request's arguments.
    #[error(transparent)]
    HandlerInvocation(#[from] InvokeError),

    #[error("request body could not be parsed: {0}")]
    Body(String),

    #[error(transparent)]
    Middleware(#[from] MiddlewareError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl Error {
    pub(crate) fn compilation(msg: impl Into<String>) -> Self {
        Error::Compilation(msg.into())
    }
}

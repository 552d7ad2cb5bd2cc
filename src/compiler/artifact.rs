//! Text form of a route table.
//!
//! The artifact is JSON Lines: one [`CompiledRoute`] object per line. Lines
//! starting with `#` and blank lines are ignored, which leaves room for a
//! header and for comments added by extensions.

use super::route::CompiledRoute;
use crate::error::{Error, Result};

pub const ARTIFACT_HEADER: &str = "# routeforge route table v1";

/// A line that does not hold a valid route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// One-based line number.
    pub line: usize,
    pub reason: String,
}

/// Serialize routes under the artifact header, one per line.
pub fn render(routes: &[CompiledRoute]) -> Result<String> {
    let mut out = String::with_capacity(64 * (routes.len() + 1));
    out.push_str(ARTIFACT_HEADER);
    out.push('\n');
    for route in routes {
        let line = route
            .to_line()
            .map_err(|e| Error::compilation(format!("cannot serialize {route}: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

pub fn parse(text: &str) -> Result<Vec<CompiledRoute>, LineError> {
    let mut routes = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let route = serde_json::from_str(line).map_err(|e| LineError {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        routes.push(route);
    }
    Ok(routes)
}

//! Path pattern syntax: literal segments and `{name}` / `{name:regex}` captures.
//!
//! A capture always spans a whole segment. Its optional regex is anchored to
//! that segment, so `{id:\d+}` matches `42` but not `42abc`.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unbalanced braces in `{0}`")]
    Unbalanced(String),

    #[error("segment `{segment}` of `{pattern}` mixes literal text and a capture")]
    PartialSegment { pattern: String, segment: String },

    #[error("invalid capture name `{name}` in `{pattern}`")]
    InvalidName { pattern: String, name: String },

    #[error("capture `{name}` appears twice in `{pattern}`")]
    DuplicateCapture { pattern: String, name: String },

    #[error("invalid constraint for `{name}` in `{pattern}`: {reason}")]
    InvalidConstraint {
        pattern: String,
        name: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture {
        name: String,
        constraint: Option<String>,
    },
}

/// A parsed and validated path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse `pattern`; empty segments are ignored, so `""` and `"/"` are the root.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        for raw in split_segments(pattern)? {
            let segment = parse_segment(pattern, raw)?;
            if let Segment::Capture { name, .. } = &segment {
                let seen = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Capture { name: n, .. } if n == name));
                if seen {
                    return Err(PatternError::DuplicateCapture {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
            }
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Capture names in path order.
    pub fn captures(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Capture { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

/// Join a controller base path and a route pattern.
///
/// Each part contributes `/part` when non-empty, so an empty base and an
/// empty pattern give the empty (root) path.
#[must_use]
pub fn join_path(base: &str, pattern: &str) -> String {
    let mut path = String::with_capacity(base.len() + pattern.len() + 2);
    for part in [base.trim_matches('/'), pattern.trim_matches('/')] {
        if !part.is_empty() {
            path.push('/');
            path.push_str(part);
        }
    }
    path
}

/// Compile a capture constraint anchored to a single segment.
pub(crate) fn compile_constraint(constraint: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{constraint})$"))
}

/// Split on `/` outside braces, dropping empty segments.
fn split_segments(pattern: &str) -> Result<Vec<&str>, PatternError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in pattern.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| PatternError::Unbalanced(pattern.to_string()))?;
            }
            '/' if depth == 0 => {
                if i > start {
                    segments.push(&pattern[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(PatternError::Unbalanced(pattern.to_string()));
    }
    if start < pattern.len() {
        segments.push(&pattern[start..]);
    }
    Ok(segments)
}

fn parse_segment(pattern: &str, raw: &str) -> Result<Segment, PatternError> {
    if !raw.contains(['{', '}']) {
        return Ok(Segment::Literal(raw.to_string()));
    }

    let partial = || PatternError::PartialSegment {
        pattern: pattern.to_string(),
        segment: raw.to_string(),
    };
    if !raw.starts_with('{') || !raw.ends_with('}') || closes_early(raw) {
        return Err(partial());
    }

    let inner = &raw[1..raw.len() - 1];
    let (name, constraint) = match inner.split_once(':') {
        Some((name, constraint)) => (name, Some(constraint)),
        None => (inner, None),
    };

    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && name.chars().all(|c| c == '_' || c.is_ascii_alphanumeric());
    if !valid_name {
        return Err(PatternError::InvalidName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }

    if let Some(constraint) = constraint {
        let invalid = |reason: String| PatternError::InvalidConstraint {
            pattern: pattern.to_string(),
            name: name.to_string(),
            reason,
        };
        if constraint.is_empty() {
            return Err(invalid("empty regex".to_string()));
        }
        compile_constraint(constraint).map_err(|e| invalid(e.to_string()))?;
    }

    Ok(Segment::Capture {
        name: name.to_string(),
        constraint: constraint.map(str::to_string),
    })
}

/// True when the opening brace is closed before the end of the segment.
fn closes_early(raw: &str) -> bool {
    let mut depth = 0usize;
    let last = raw.len() - 1;
    for (i, c) in raw.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != last {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

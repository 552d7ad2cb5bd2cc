//! Discovery of candidate controller types in a source directory.
//!
//! Only the top level of the directory is visited, and only `*.rs` files.
//! Each file is tokenized just far enough to find the first `struct` or
//! `enum` item outside comments and literals; nothing is compiled or loaded.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// A type name qualified by the module its file defines.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    /// Module path derived from the file name; empty for crate roots.
    pub module: String,
    pub name: String,
}

impl QualifiedName {
    #[must_use]
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}::{}", self.module, self.name)
        }
    }
}

/// Scan `dir` for type names, in file-name order.
///
/// Files that declare no type are skipped. A missing or unreadable directory
/// is a [`Error::Discovery`].
pub fn scan_directory(dir: impl AsRef<Path>) -> Result<Vec<QualifiedName>> {
    let dir = dir.as_ref();
    let discovery = |source| Error::Discovery {
        path: dir.to_path_buf(),
        source,
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(discovery)? {
        let path = entry.map_err(discovery)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    files.sort();

    let mut names = Vec::with_capacity(files.len());
    for file in &files {
        let source = fs::read_to_string(file).map_err(discovery)?;
        match extract_type_name(&source, &module_for(file)) {
            Some(name) => {
                debug!(file = %file.display(), type_name = %name, "Discovered type");
                names.push(name);
            }
            None => debug!(file = %file.display(), "No type declaration, skipping"),
        }
    }

    info!(
        dir = %dir.display(),
        files = files.len(),
        types = names.len(),
        "Controller directory scanned"
    );
    Ok(names)
}

/// Module qualifier implied by a file's location.
fn module_for(file: &Path) -> String {
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match stem {
        "lib" | "main" => String::new(),
        "mod" => file
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string(),
        other => other.to_string(),
    }
}

/// The first `struct`/`enum` name declared in `source`, qualified with `module`.
#[must_use]
pub fn extract_type_name(source: &str, module: &str) -> Option<QualifiedName> {
    let mut idents = Identifiers::new(source);
    while let Some(ident) = idents.next() {
        if ident == "struct" || ident == "enum" {
            return idents.next().map(|name| QualifiedName::new(module, name));
        }
    }
    None
}

/// Identifier tokens of Rust source, skipping comments and literals.
struct Identifiers<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Identifiers<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    /// Block comments nest in Rust.
    fn skip_block_comment(&mut self) {
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 {
            match (self.peek(0), self.peek(1)) {
                (None, _) => return,
                (Some(b'/'), Some(b'*')) => {
                    depth += 1;
                    self.pos += 2;
                }
                (Some(b'*'), Some(b'/')) => {
                    depth -= 1;
                    self.pos += 2;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Skips a `"..."` literal starting at the opening quote.
    fn skip_string(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            match b {
                b'\\' => self.pos += 1,
                b'"' => return,
                _ => {}
            }
        }
    }

    /// Skips `r"..."` / `r#"..."#` starting at the opening quote, given the hash count.
    fn skip_raw_string(&mut self, hashes: usize) {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            if b == b'"' && (0..hashes).all(|i| self.peek(i) == Some(b'#')) {
                self.pos += hashes;
                return;
            }
        }
    }

    /// A quote either opens a char literal or a lifetime/label.
    fn skip_quote(&mut self) {
        match (self.peek(1), self.peek(2)) {
            (Some(b'\\'), _) => {
                self.pos += 2;
                while let Some(b) = self.peek(0) {
                    self.pos += 1;
                    if b == b'\'' {
                        return;
                    }
                }
            }
            (Some(_), Some(b'\'')) => self.pos += 3,
            (Some(c), _) if c >= 0x80 => {
                // Multi-byte char literal such as 'é'.
                let rest = &self.src[self.pos + 1..];
                match rest.char_indices().nth(1) {
                    Some((i, '\'')) => self.pos += 1 + i + 1,
                    _ => self.pos += 1,
                }
            }
            _ => self.pos += 1,
        }
    }

    fn read_ident(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek(0)
            .is_some_and(|b| b == b'_' || b.is_ascii_alphanumeric() || b >= 0x80)
        {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn raw_string_hashes(&self) -> Option<usize> {
        let mut n = 0;
        while self.peek(1 + n) == Some(b'#') {
            n += 1;
        }
        (self.peek(1 + n) == Some(b'"')).then_some(n)
    }
}

impl<'a> Iterator for Identifiers<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some(b) = self.peek(0) {
            match b {
                b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment(),
                b'"' => self.skip_string(),
                b'\'' => self.skip_quote(),
                b'b' if self.peek(1) == Some(b'"') => {
                    self.pos += 1;
                    self.skip_string();
                }
                b'r' | b'b' if self.peek(0) == Some(b'r') || self.peek(1) == Some(b'r') => {
                    let prefix = if b == b'b' { 1 } else { 0 };
                    self.pos += prefix;
                    match self.raw_string_hashes() {
                        Some(hashes) => {
                            self.pos += 1 + hashes;
                            self.skip_raw_string(hashes);
                        }
                        None => {
                            self.pos -= prefix;
                            return Some(self.read_ident());
                        }
                    }
                }
                b if b == b'_' || b.is_ascii_alphabetic() || b >= 0x80 => {
                    return Some(self.read_ident());
                }
                b if b.is_ascii_digit() => {
                    // Numeric literal, including suffixes like 10u8.
                    self.read_ident();
                }
                _ => self.pos += 1,
            }
        }
        None
    }
}

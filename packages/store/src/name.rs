//! Validated flat file names.

use std::fmt;
use std::path::{self, PathBuf};

use crate::StoreError;

/// A file name that is safe to join onto a storage root.
///
/// Names are a single path segment: they never contain a path separator and
/// are never `""`, `"."`, or `".."`. The check is a conservative allowlist
/// and does not consult the filesystem.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileName(String);

impl FileName {
    /// Validate a raw client-supplied name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filedrop_store::FileName;
    ///
    /// assert!(FileName::parse("report.txt").is_ok());
    /// assert!(FileName::parse("../etc/passwd").is_err());
    /// assert!(FileName::parse("..").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        if raw.is_empty() || raw == "." || raw == ".." || raw.chars().any(path::is_separator) {
            return Err(StoreError::forbidden(raw));
        }
        Ok(FileName(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join this name onto `root`.
    pub fn resolve(&self, root: &path::Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate `raw` and join it onto `root`.
///
/// `root` is always supplied by the caller's configuration, never by the
/// request.
pub fn validate(root: &path::Path, raw: &str) -> Result<PathBuf, StoreError> {
    Ok(FileName::parse(raw)?.resolve(root))
}

//! Error types for the store layer.

use std::io;
use std::path::PathBuf;

/// Errors produced by name validation and file store operations.
///
/// None of these are transient: the store never retries, and callers are
/// expected to surface each variant to the client as-is.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The client-supplied name could escape the storage root.
    #[error("path {name:?} not allowed")]
    Forbidden { name: String },

    /// The target does not exist, or exists but is not a regular file.
    #[error("not found")]
    NotFound,

    /// Any other I/O failure.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The storage root could not be created or is not a directory.
    #[error("An error occurred trying to use the root path {path}: {error}")]
    RootPathInvalid { path: PathBuf, error: io::Error },
}

impl StoreError {
    pub fn forbidden(name: impl Into<String>) -> Self {
        StoreError::Forbidden { name: name.into() }
    }

    /// Map an I/O error, turning `NotFound` into [`StoreError::NotFound`].
    pub fn from_lookup(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound
        } else {
            StoreError::Io(error)
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

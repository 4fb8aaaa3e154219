//! The file store interface.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncRead;

use crate::error::Result;
use crate::name;

/// Whether a write created a new entry or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The exclusive create succeeded; no entry existed under this name.
    Created,
    /// An entry already existed and was truncated and rewritten.
    Overwritten,
}

impl WriteOutcome {
    pub fn created(self) -> bool {
        self == WriteOutcome::Created
    }
}

/// A regular file opened for reading.
///
/// The handle is released when this value (or the stream built from
/// `file`) is dropped.
#[derive(Debug)]
pub struct OpenFile {
    pub file: File,
    pub len: u64,
    /// `None` when the platform does not report modification times.
    pub modified: Option<SystemTime>,
}

/// A flat, single-directory file store.
///
/// Every operation takes a path that has already been resolved through
/// [`FileStore::resolve`]; the store itself does no name checking.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn FileStore>`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// The storage root all names resolve beneath.
    fn root(&self) -> &Path;

    /// Validate a client-supplied name and join it onto the root.
    fn resolve(&self, raw: &str) -> Result<PathBuf> {
        name::validate(self.root(), raw)
    }

    /// Names of every entry directly under the root.
    async fn list(&self) -> Result<Vec<String>>;

    /// Open a regular file for reading.
    ///
    /// # Returns
    ///
    /// * `Err(StoreError::NotFound)` - The path is missing or not a regular file.
    /// * `Err(StoreError::Io(_))` - Any other failure, including a failed stat.
    async fn open_for_read(&self, path: &Path) -> Result<OpenFile>;

    /// Copy all of `input` into the file at `path`.
    ///
    /// A failed copy or flush leaves whatever was written on disk.
    async fn write(
        &self,
        path: &Path,
        input: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<WriteOutcome>;

    /// Delete the file at `path`.
    async fn remove(&self, path: &Path) -> Result<()>;
}

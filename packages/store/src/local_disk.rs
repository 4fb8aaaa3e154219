use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::error::Result;
use crate::traits::{FileStore, OpenFile, WriteOutcome};
use crate::StoreError;

/// A [`FileStore`] backed by one directory on the local filesystem.
///
/// The directory is the only source of truth: nothing is cached in memory,
/// and concurrent writers are arbitrated by the exclusive create in
/// [`LocalDiskStore::write`].
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if let Err(error) = fs::create_dir_all(&root).await {
            return Err(StoreError::RootPathInvalid { path: root, error });
        }

        let attr = match fs::metadata(&root).await {
            Ok(attr) => attr,
            Err(error) => return Err(StoreError::RootPathInvalid { path: root, error }),
        };

        if !attr.is_dir() {
            return Err(StoreError::RootPathInvalid {
                path: root,
                error: io::Error::other("Root path must be a directory."),
            });
        }

        Ok(LocalDiskStore { root })
    }
}

/// Open `path` if it is a regular file.
///
/// Missing paths and non-regular files both report [`StoreError::NotFound`]
/// so callers cannot probe the directory layout.
pub async fn open_regular_file(path: &Path) -> Result<OpenFile> {
    let file = File::open(path).await.map_err(StoreError::from_lookup)?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(StoreError::NotFound);
    }

    Ok(OpenFile {
        file,
        len: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

/// Create `path` exclusively, or truncate it if it already exists.
async fn create_file(path: &Path) -> Result<(File, WriteOutcome)> {
    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => return Ok((file, WriteOutcome::Created)),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {}
        Err(error) => return Err(error.into()),
    }

    let file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(path)
        .await?;
    Ok((file, WriteOutcome::Overwritten))
}

#[async_trait]
impl FileStore for LocalDiskStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn open_for_read(&self, path: &Path) -> Result<OpenFile> {
        tracing::debug!(path = %path.display(), "opening for read");
        open_regular_file(path).await
    }

    async fn write(
        &self,
        path: &Path,
        input: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<WriteOutcome> {
        let (mut file, outcome) = create_file(path).await?;
        tracing::debug!(path = %path.display(), ?outcome, "writing");

        let copied = tokio::io::copy(input, &mut file).await;
        let flushed = file.flush().await;
        drop(file);

        let bytes = copied?;
        flushed?;
        tracing::debug!(path = %path.display(), bytes, "write complete");
        Ok(outcome)
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        let error = match fs::remove_file(path).await {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };
        // Directories show up in `list`; empty ones can be removed too.
        if error.kind() != io::ErrorKind::NotFound {
            let is_dir = fs::symlink_metadata(path)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            if is_dir {
                return fs::remove_dir(path).await.map_err(StoreError::from_lookup);
            }
        }
        Err(StoreError::from_lookup(error))
    }
}

//! # filedrop-store
//!
//! The storage layer of filedrop: a single flat directory of named files.
//!
//! - [`FileName`] / [`validate`]: reject names that could escape the root
//! - [`FileStore`]: list, open, write (create-or-overwrite), remove
//! - [`LocalDiskStore`]: the on-disk implementation
//!
//! # Example
//!
//! ```rust,no_run
//! use filedrop_store::{FileStore, LocalDiskStore, WriteOutcome};
//!
//! # async fn demo() -> Result<(), filedrop_store::StoreError> {
//! let store = LocalDiskStore::open("/var/lib/filedrop").await?;
//! let path = store.resolve("report.txt")?;
//! let outcome = store.write(&path, &mut &b"hello"[..]).await?;
//! assert_eq!(outcome, WriteOutcome::Created);
//! # Ok(())
//! # }
//! ```

mod error;
mod local_disk;
mod name;
mod traits;

pub use error::{Result, StoreError};
pub use local_disk::{open_regular_file, LocalDiskStore};
pub use name::{validate, FileName};
pub use traits::{FileStore, OpenFile, WriteOutcome};

//! # filedrop-http
//!
//! The HTTP surface of filedrop.
//!
//! ## Routes
//!
//! | Method   | Path           | Permission | Result                          |
//! |----------|----------------|------------|---------------------------------|
//! | `GET`    | `/file/`       | `read`     | `200` `{"entries":[{"name"}]}`  |
//! | `GET`    | `/file/{name}` | `read`     | `200` file body (ranges, `304`) |
//! | `PUT`    | `/file/{name}` | `write`    | `201` created, `204` overwrote  |
//! | `DELETE` | `/file/{name}` | `delete`   | `204`                           |
//!
//! Invalid names are `403`, missing files `404`, storage failures `500`.
//! When a data directory is configured, `/` renders the index page and the
//! fixed set of UI assets in [`ui::RESOURCES`] is served alongside.
//!
//! ## Access control
//!
//! With [`AccessControl::Enabled`], a trusted front proxy supplies the
//! caller's capabilities in a header (`X-Sandstorm-Permissions: read,write`).
//! Requests lacking the required capability are refused before any file is
//! touched.
//!
//! ```ignore
//! use filedrop_http::{serve, AccessControl, ServerConfig};
//!
//! let config = ServerConfig::new("127.0.0.1:8080", "/var/lib/filedrop")
//!     .with_access(AccessControl::enabled());
//! serve(config).await?;
//! ```

pub mod config;
pub mod content;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod server;
pub mod ui;

pub use config::ServerConfig;
pub use dispatch::{AppState, DirEntry, DirList};
pub use error::{ApiError, ServerError};
pub use gate::{AccessControl, Permission, PermissionSet, DEFAULT_PERMISSION_HEADER};
pub use server::{build_state, router, run, serve, shutdown_signal};

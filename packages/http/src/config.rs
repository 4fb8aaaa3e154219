//! Server configuration, built once at startup.

use std::path::PathBuf;

use crate::gate::AccessControl;

/// Everything the server needs to start.
///
/// Request handling never reads configuration from anywhere else; the
/// relevant parts are copied into [`crate::AppState`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on, e.g. `127.0.0.1:8080`.
    pub address: String,
    /// Directory all files are stored in.
    pub storage_root: PathBuf,
    /// Directory holding `index.html` and the UI assets. No UI when `None`.
    pub data_dir: Option<PathBuf>,
    pub access: AccessControl,
}

impl ServerConfig {
    pub fn new(address: impl Into<String>, storage_root: impl Into<PathBuf>) -> Self {
        ServerConfig {
            address: address.into(),
            storage_root: storage_root.into(),
            data_dir: None,
            access: AccessControl::Disabled,
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn with_access(mut self, access: AccessControl) -> Self {
        self.access = access;
        self
    }
}

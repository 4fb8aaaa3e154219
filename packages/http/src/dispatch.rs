//! File operation handlers.
//!
//! Every handler runs the same sequence: permission check (a route layer,
//! see [`crate::gate::require`]), name validation, one store call, and
//! translation of the outcome into a response. Nothing is retried.

use std::io;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, put};
use axum::Router;
use filedrop_store::FileStore;
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::io::StreamReader;
use tracing::info;

use crate::content::{serve_file, ServeOptions};
use crate::error::ApiError;
use crate::gate::{require, AccessControl, Permission};
use crate::ui::Ui;

/// Shared, read-only request context built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FileStore>,
    pub access: AccessControl,
    pub ui: Option<Arc<Ui>>,
}

impl AppState {
    pub fn new(store: Arc<dyn FileStore>, access: AccessControl) -> Self {
        AppState {
            store,
            access,
            ui: None,
        }
    }

    pub fn with_ui(mut self, ui: Ui) -> Self {
        self.ui = Some(Arc::new(ui));
        self
    }
}

/// List payload: `{"entries": [{"name": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirList {
    pub entries: Vec<DirEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
}

async fn list_files(State(state): State<AppState>) -> Result<Json<DirList>, ApiError> {
    let names = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::from_store("list", e))?;
    info!(count = names.len(), "list files");

    Ok(Json(DirList {
        entries: names.into_iter().map(|name| DirEntry { name }).collect(),
    }))
}

async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let path = state
        .store
        .resolve(&name)
        .map_err(|e| ApiError::from_store("download", e))?;
    let opened = state
        .store
        .open_for_read(&path)
        .await
        .map_err(|e| ApiError::from_store("download", e))?;
    info!(name = %name, size = opened.len, "download");

    serve_file(
        opened,
        &headers,
        ServeOptions {
            name: &name,
            attachment: true,
            operation: "download",
        },
    )
    .await
}

async fn upload_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Body,
) -> Result<Response, ApiError> {
    let path = state
        .store
        .resolve(&name)
        .map_err(|e| ApiError::from_store("upload", e))?;

    let mut reader = StreamReader::new(body.into_data_stream().map_err(io::Error::other));
    let outcome = state
        .store
        .write(&path, &mut reader)
        .await
        .map_err(|e| ApiError::from_store("upload", e))?;
    info!(name = %name, ?outcome, "upload");

    if outcome.created() {
        Ok(StatusCode::CREATED.into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let path = state
        .store
        .resolve(&name)
        .map_err(|e| ApiError::from_store("delete", e))?;
    state
        .store
        .remove(&path)
        .await
        .map_err(|e| ApiError::from_store("delete", e))?;
    info!(name = %name, "delete");
    Ok(StatusCode::NO_CONTENT)
}

/// The `/file/` API, each verb guarded by its permission.
///
/// `{*name}` captures the whole remainder of the path so that names with
/// separators reach validation and are refused there.
pub fn routes(access: &AccessControl) -> Router<AppState> {
    Router::new()
        .route("/file/", require(get(list_files), access, Permission::Read))
        .route(
            "/file/{*name}",
            require(get(download_file), access, Permission::Read)
                .merge(require(
                    put(upload_file).layer(DefaultBodyLimit::disable()),
                    access,
                    Permission::Write,
                ))
                .merge(require(delete(delete_file), access, Permission::Delete)),
        )
}

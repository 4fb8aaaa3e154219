//! The browser UI: an index page and a fixed set of static assets, all read
//! from a data directory.

use std::path::{Path, PathBuf};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use axum::routing::get;
use axum::Router;
use filedrop_store::open_regular_file;

use crate::content::{serve_file, ServeOptions};
use crate::dispatch::AppState;
use crate::error::{ApiError, ServerError};
use crate::gate::PermissionSet;

/// Template file, relative to the data directory.
pub const INDEX_TEMPLATE: &str = "index.html";

/// Replaced with a JSON array of the caller's permissions.
pub const PERMISSIONS_PLACEHOLDER: &str = "[[.Permissions]]";

/// URL path → file under the data directory.
pub const RESOURCES: &[(&str, &str)] = &[
    ("/bundle.css", "client/bundle.css"),
    ("/bundle.js", "client/bundle.js"),
    (
        "/fonts/Roboto-Regular.woff",
        "third_party/roboto/Roboto-Regular.woff",
    ),
    (
        "/fonts/Roboto-Bold.woff",
        "third_party/roboto/Roboto-Bold.woff",
    ),
    (
        "/icons/action.svg",
        "third_party/material_design_icons/sprites/svg-sprite/svg-sprite-action.svg",
    ),
    (
        "/icons/file.svg",
        "third_party/material_design_icons/sprites/svg-sprite/svg-sprite-file.svg",
    ),
    (
        "/icons/navigation.svg",
        "third_party/material_design_icons/sprites/svg-sprite/svg-sprite-navigation.svg",
    ),
];

/// The loaded UI: the index template is read once at startup, assets are
/// read per request.
#[derive(Debug)]
pub struct Ui {
    data_dir: PathBuf,
    index: String,
}

impl Ui {
    pub async fn load(data_dir: impl Into<PathBuf>) -> Result<Self, ServerError> {
        let data_dir = data_dir.into();
        let path = data_dir.join(INDEX_TEMPLATE);
        let index = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ServerError::Template { path, source })?;
        Ok(Ui { data_dir, index })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn render_index(&self, permissions: &PermissionSet) -> String {
        let list =
            serde_json::Value::from(permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>());
        self.index.replace(PERMISSIONS_PLACEHOLDER, &list.to_string())
    }
}

async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, ApiError> {
    let ui = state.ui.as_ref().ok_or(ApiError::NotFound)?;
    let permissions = state.access.effective_permissions(&headers);
    Ok(Html(ui.render_index(&permissions)))
}

async fn resource(
    state: AppState,
    relative: &'static str,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let ui = state.ui.as_ref().ok_or(ApiError::NotFound)?;
    let opened = open_regular_file(&ui.data_dir().join(relative))
        .await
        .map_err(|e| ApiError::from_store("resource", e))?;

    let name = Path::new(relative)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(relative);
    serve_file(
        opened,
        &headers,
        ServeOptions {
            name,
            attachment: false,
            operation: "resource",
        },
    )
    .await
}

/// Routes for `/` and every entry of [`RESOURCES`]. None are permission-gated.
pub fn routes() -> Router<AppState> {
    let mut router = Router::new().route("/", get(index));
    for &(route, relative) in RESOURCES {
        router = router.route(
            route,
            get(move |State(state): State<AppState>, headers: HeaderMap| {
                resource(state, relative, headers)
            }),
        );
    }
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Permission;
    use tempfile::TempDir;

    async fn load_with(template: &str) -> (TempDir, Ui) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(INDEX_TEMPLATE), template).unwrap();
        let ui = Ui::load(dir.path()).await.unwrap();
        (dir, ui)
    }

    #[tokio::test]
    async fn renders_permissions_as_json() {
        let (_dir, ui) = load_with("<script>var perms = [[.Permissions]];</script>").await;
        let html = ui.render_index(&PermissionSet::all());
        assert_eq!(
            html,
            r#"<script>var perms = ["read","write","delete"];</script>"#
        );
    }

    #[tokio::test]
    async fn renders_partial_and_empty_sets() {
        let (_dir, ui) = load_with("[[.Permissions]]").await;
        let only_read: PermissionSet = [Permission::Read].into_iter().collect();
        assert_eq!(ui.render_index(&only_read), r#"["read"]"#);
        assert_eq!(ui.render_index(&PermissionSet::empty()), "[]");
    }

    #[tokio::test]
    async fn missing_template_fails_to_load() {
        let dir = TempDir::new().unwrap();
        let result = Ui::load(dir.path()).await;
        assert!(matches!(result, Err(ServerError::Template { .. })));
    }
}

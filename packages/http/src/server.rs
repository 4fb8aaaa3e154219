use std::future::Future;
use std::sync::Arc;

use axum::Router;
use filedrop_store::LocalDiskStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::dispatch::{self, AppState};
use crate::error::ServerError;
use crate::ui::{self, Ui};

/// Build the full application router for `state`.
pub fn router(state: AppState) -> Router {
    let mut app = dispatch::routes(&state.access);
    if state.ui.is_some() {
        app = app.merge(ui::routes());
    }
    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Open the storage root and load the UI described by `config`.
pub async fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let store = LocalDiskStore::open(&config.storage_root)
        .await
        .map_err(ServerError::Storage)?;
    let mut state = AppState::new(Arc::new(store), config.access.clone());

    if let Some(data_dir) = &config.data_dir {
        state = state.with_ui(Ui::load(data_dir).await?);
    }
    Ok(state)
}

/// Serve requests from `listener` until `shutdown` resolves.
///
/// Each connection runs on its own task; in-flight requests are allowed to
/// finish after shutdown is signalled.
pub async fn run<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

/// Start a server for `config` and run until Ctrl-C or SIGTERM.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let state = build_state(&config).await?;
    let listener = TcpListener::bind(&config.address)
        .await
        .map_err(|source| ServerError::Bind {
            address: config.address.clone(),
            source,
        })?;

    let local_addr = listener.local_addr().map_err(ServerError::Serve)?;
    info!(
        address = %local_addr,
        storage = %config.storage_root.display(),
        access_control = config.access.is_enabled(),
        ui = state.ui.is_some(),
        "listening"
    );
    run(listener, state, shutdown_signal()).await
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}

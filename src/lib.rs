pub mod api;
pub mod config;
pub mod error;
pub mod storage;

use anyhow::Result;
use std::sync::Arc;
use axum::{Server, Router, extract::{DefaultBodyLimit, Extension}, http::Uri};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, StorageConfig};
use crate::error::{ErrorKind, ServerResult};
use crate::storage::{StorageBackend, local::LocalBackend};

/// Global server state.
#[derive(Debug, Clone)]
pub struct State {
    /// The Filedrop configuration.
    config: Config,
    /// Handle to the storage backend.
    storage: Arc<dyn StorageBackend>,
}
impl State {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let storage: Arc<dyn StorageBackend> = match &config.storage {
            StorageConfig::Local(local_config) => {
                Arc::new(LocalBackend::new(local_config.clone()).await?)
            }
        };

        Ok(Arc::new(Self {
            config,
            storage,
        }))
    }
    /// Returns a handle to the storage backend.
    fn storage(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.storage)
    }
}

/// Builds the application router.
pub fn router(state: Arc<State>) -> Router {
    let body_limit = match state.config.max_upload_size {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .merge(api::router())
        .fallback(fallback)
        .layer(body_limit)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

/// Runs the API server.
pub async fn run_api_server(config: Config) -> Result<()> {
    tracing::info!("Starting API server...");

    if config.max_upload_size.is_none() {
        tracing::warn!("No upload size limit is set, uploads are buffered in memory whole.");
    }

    let listen = config.listen;
    let state = State::new(config).await?;
    let rest = router(state);

    tracing::info!("Listening on {:?}...", listen);
    Server::bind(&listen).serve(rest.into_make_service()).await?;

    Ok(())
}

/// The fallback route.
#[axum_macros::debug_handler]
async fn fallback(_: Uri) -> ServerResult<()> {
    Err(ErrorKind::NotFound.into())
}

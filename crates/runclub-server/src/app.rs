//! Server wiring: state, router, and the serve loop.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use group_lifecycle::{Coordinator, GroupEventSink, TracingSink};
use group_record_store::SqliteGroupStore;
use runclub_config_and_utils::{Config, Paths};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api;

/// Shared handler state.
pub(crate) struct AppState<K: GroupEventSink> {
    pub coordinator: Arc<Coordinator<K>>,
}

impl<K: GroupEventSink> Clone for AppState<K> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
        }
    }
}

pub(crate) fn router<K: GroupEventSink + 'static>(state: AppState<K>) -> Router {
    Router::new()
        .route("/healthz", get(api::health))
        .route("/groups/create-or-match", post(api::create_or_match::<K>))
        .route("/groups/upcoming", get(api::upcoming::<K>))
        .route("/groups/:id", get(api::group::<K>))
        .route("/groups/:id/join", post(api::join::<K>))
        .route("/groups/:id/leave", post(api::leave::<K>))
        .route("/groups/:id/cancel", post(api::cancel::<K>))
        .with_state(state)
}

/// Open the record store and serve until Ctrl-C.
pub(crate) async fn run(
    config: &Config,
    paths: &Paths,
    listen: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    paths.ensure_dirs()?;
    let database = paths.database_file();
    let store = Arc::new(SqliteGroupStore::open(&database)?);
    let coordinator =
        Coordinator::new(store, TracingSink).with_capacity(config.default_capacity);
    let app = router(AppState {
        coordinator: Arc::new(coordinator),
    });

    let listener = TcpListener::bind(listen).await?;
    info!(
        addr = %listener.local_addr()?,
        database = %database.display(),
        capacity = config.default_capacity,
        "runclub server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("runclub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

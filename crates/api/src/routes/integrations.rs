//! Route definitions for chat/meeting integration sync.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::integrations;
use crate::state::AppState;

/// Integration routes mounted at `/integrations`.
///
/// ```text
/// GET  /sync-log              -> list_sync_log
/// POST /{provider}/sync       -> run_sync
/// GET  /{provider}/config     -> get_sync_config
/// PUT  /{provider}/config     -> update_sync_config
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync-log", get(integrations::list_sync_log))
        .route("/{provider}/sync", post(integrations::run_sync))
        .route(
            "/{provider}/config",
            get(integrations::get_sync_config).put(integrations::update_sync_config),
        )
}

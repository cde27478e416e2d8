//! `GET /health`: liveness plus the state of the timeline's moving parts.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use steward_integrations::SyncProvider;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Receivers on the change bus: live timeline listeners, plus any
    /// other subscriber.
    pub live_subscribers: usize,
    pub sync_providers: Vec<SyncProvider>,
    pub geocode_cache_entries: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match steward_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        live_subscribers: state.change_bus.subscriber_count(),
        sync_providers: state.sync.providers(),
        geocode_cache_entries: state.geocoder.cached().await,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

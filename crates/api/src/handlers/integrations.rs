//! Handlers for chat/meeting integration sync.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use steward_integrations::{SyncProvider, MAX_SYNC_LOG_ENTRIES};

use crate::error::AppResult;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateSyncConfig {
    pub enabled: bool,
}

/// POST /integrations/{provider}/sync
///
/// Runs one sync to completion and returns its log entry. A run whose
/// client failed is still a `200` with `status: "failed"`.
pub async fn run_sync(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> AppResult<impl IntoResponse> {
    let provider: SyncProvider = provider.parse()?;
    let entry = state.sync.run_sync(provider).await?;
    Ok(Json(DataResponse { data: entry }))
}

/// GET /integrations/sync-log?limit=
///
/// Newest first, at most `MAX_SYNC_LOG_ENTRIES`.
pub async fn list_sync_log(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(MAX_SYNC_LOG_ENTRIES);
    let entries = state.sync.recent_logs(limit).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /integrations/{provider}/config
pub async fn get_sync_config(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> AppResult<impl IntoResponse> {
    let provider: SyncProvider = provider.parse()?;
    let config = state.sync.config(provider).await?;
    Ok(Json(DataResponse { data: config }))
}

/// PUT /integrations/{provider}/config
pub async fn update_sync_config(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(input): Json<UpdateSyncConfig>,
) -> AppResult<impl IntoResponse> {
    let provider: SyncProvider = provider.parse()?;
    let config = state.sync.set_enabled(provider, input.enabled).await?;
    tracing::info!(%provider, enabled = input.enabled, "Sync configuration updated");
    Ok(Json(DataResponse { data: config }))
}

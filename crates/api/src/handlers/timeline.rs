//! Handlers for the merged relationship timeline.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use steward_core::timeline::clamp_page_size;

use crate::error::AppResult;
use crate::query::{EntityParams, TimelineQueryParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /timeline
///
/// One page of the merged timeline, newest first. Pass the previous page's
/// `nextCursor` back as `cursor_ts` + `cursor_id` to continue. Sources that
/// fail are listed in `degradedSources` instead of failing the request.
pub async fn get_timeline(
    State(state): State<AppState>,
    Query(params): Query<TimelineQueryParams>,
) -> AppResult<impl IntoResponse> {
    let filters = params.filters()?;
    let cursor = params.cursor()?;
    let page_size = clamp_page_size(params.page_size);

    let page = state
        .timeline
        .fetch_timeline(&filters, cursor.as_ref(), page_size)
        .await?;

    if page.is_degraded() {
        tracing::warn!(
            entity_id = %filters.entity_id,
            degraded = page.degraded_sources.len(),
            "Serving degraded timeline page"
        );
    }

    Ok(Json(DataResponse { data: page }))
}

/// GET /timeline/stats
///
/// Summary statistics over the entity's most recent events.
pub async fn get_summary_stats(
    State(state): State<AppState>,
    Query(params): Query<EntityParams>,
) -> AppResult<impl IntoResponse> {
    let filters = params.filters()?;
    let stats = state
        .timeline
        .summary_stats(&filters, chrono::Utc::now())
        .await?;

    Ok(Json(DataResponse { data: stats }))
}

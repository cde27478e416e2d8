//! Route definitions for the relationship timeline.

use axum::routing::get;
use axum::Router;

use crate::handlers::timeline;
use crate::state::AppState;
use crate::ws;

/// Timeline routes mounted at `/timeline`.
///
/// ```text
/// GET  /        -> get_timeline
/// GET  /stats   -> get_summary_stats
/// GET  /live    -> live_timeline_ws (WebSocket upgrade)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(timeline::get_timeline))
        .route("/stats", get(timeline::get_summary_stats))
        .route("/live", get(ws::live_timeline_ws))
}

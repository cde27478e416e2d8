pub mod activities;
pub mod geocode;
pub mod health;
pub mod integrations;
pub mod timeline;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /timeline                                        merged page (GET)
/// /timeline/stats                                  summary statistics (GET)
/// /timeline/live                                   WebSocket live updates
///
/// /activities                                      create (POST)
/// /activities/{id}                                 get, delete (?confirm=true)
///
/// /geocode                                         geocode ?address= (GET)
///
/// /integrations/sync-log                           rolling sync log (GET)
/// /integrations/{provider}/sync                    run a sync (POST)
/// /integrations/{provider}/config                  get, update (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Relationship timeline, statistics and live feed.
        .nest("/timeline", timeline::router())
        // Activity writes.
        .nest("/activities", activities::router())
        // Address geocoding.
        .nest("/geocode", geocode::router())
        // Chat/meeting sync.
        .nest("/integrations", integrations::router())
}

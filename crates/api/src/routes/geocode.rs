use axum::routing::get;
use axum::Router;

use crate::handlers::geocode;
use crate::state::AppState;

/// Geocoding routes mounted at `/geocode`.
///
/// ```text
/// GET  /?address=   -> geocode_address
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(geocode::geocode_address))
}

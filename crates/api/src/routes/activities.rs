//! Route definitions for activities.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::activities;
use crate::state::AppState;

/// Activity routes mounted at `/activities`.
///
/// ```text
/// POST   /       -> create_activity
/// GET    /{id}   -> get_activity
/// DELETE /{id}   -> delete_activity (?confirm=true)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(activities::create_activity))
        .route(
            "/{id}",
            get(activities::get_activity).delete(activities::delete_activity),
        )
}

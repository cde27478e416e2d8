//! Handlers for activity writes.
//!
//! Live timelines learn about these writes from the table trigger through
//! the notify relay, not from the handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use steward_core::error::CoreError;
use steward_core::types::DbId;
use steward_db::models::activity::CreateActivity;
use steward_db::repositories::ActivityRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// `?confirm=true` guard for destructive requests.
#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    #[serde(default)]
    pub confirm: bool,
}

fn validate(input: &CreateActivity) -> AppResult<()> {
    if input.subject.trim().is_empty() {
        return Err(CoreError::Validation("Activity subject must not be empty".into()).into());
    }
    if input.activity_type.trim().is_empty() {
        return Err(CoreError::Validation("Activity type must not be empty".into()).into());
    }
    Ok(())
}

/// POST /activities
pub async fn create_activity(
    State(state): State<AppState>,
    Json(input): Json<CreateActivity>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;

    let activity = ActivityRepo::create(&state.pool, &input).await?;
    tracing::info!(activity_id = activity.id, client_id = ?activity.client_id, "Activity created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: activity })))
}

/// GET /activities/{id}
pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let activity = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Activity",
            id,
        })?;

    Ok(Json(DataResponse { data: activity }))
}

/// DELETE /activities/{id}?confirm=true
///
/// Refuses to delete without explicit confirmation.
pub async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ConfirmParams>,
) -> AppResult<impl IntoResponse> {
    if !params.confirm {
        return Err(AppError::BadRequest(
            "Deleting an activity requires confirm=true".into(),
        ));
    }

    if !ActivityRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Activity",
            id,
        }
        .into());
    }
    tracing::info!(activity_id = id, "Activity deleted");

    Ok(StatusCode::NO_CONTENT)
}

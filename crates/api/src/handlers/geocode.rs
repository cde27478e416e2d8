use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    #[serde(default)]
    pub address: String,
}

/// GET /geocode?address=
///
/// Repeated addresses are answered from the in-process cache.
pub async fn geocode_address(
    State(state): State<AppState>,
    Query(params): Query<GeocodeParams>,
) -> AppResult<impl IntoResponse> {
    let coordinates = state.geocoder.geocode(&params.address).await?;
    Ok(Json(DataResponse { data: coordinates }))
}

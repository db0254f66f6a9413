use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::{
    error::ApiError,
    state::AppState,
    types::{MarketUpdateRequest, StatusResponse, MARKET_UPDATED, RESET},
};

/// POST /admin/update-market
///
/// A missing or malformed body is rejected before anything is touched.
pub async fn update_market(
    State(state): State<AppState>,
    payload: Result<Json<MarketUpdateRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(req) = payload?;
    state.mesh.update_market(req.into()).await;
    Ok(Json(StatusResponse::new(MARKET_UPDATED)))
}

/// POST /admin/reset
pub async fn reset_simulation(State(state): State<AppState>) -> Json<StatusResponse> {
    state.mesh.reset().await;
    Json(StatusResponse::new(RESET))
}

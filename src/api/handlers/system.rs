use axum::{extract::State, Json};

use crate::api::{
    state::AppState,
    types::{StatusResponse, MESH_ONLINE},
};
use crate::simulation::MeshSnapshot;

/// GET /
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse::new(MESH_ONLINE))
}

/// GET /state -- market, wallets, status and the recent event log
pub async fn get_state(State(state): State<AppState>) -> Json<MeshSnapshot> {
    Json(state.mesh.snapshot().await)
}

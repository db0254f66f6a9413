use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/state", get(handlers::get_state))
        // Admin endpoints
        .route("/admin/update-market", post(handlers::update_market))
        .route("/admin/reset", post(handlers::reset_simulation))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

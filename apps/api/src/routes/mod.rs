pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::skills::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Skills API
        .route(
            "/api/v1/skills",
            get(handlers::handle_list_skills).post(handlers::handle_create_skill),
        )
        .route("/api/v1/skills/:id", delete(handlers::handle_delete_skill))
        .route("/api/v1/skills/reorder", post(handlers::handle_reorder))
        .with_state(state)
}

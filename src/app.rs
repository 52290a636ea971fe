use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/vote/:id", post(handlers::vote_form))
        .route("/tasks/complete", post(handlers::complete_task_form))
        .route("/api/state", get(handlers::get_state))
        .route("/api/anime", get(handlers::get_anime))
        .route("/api/vote", post(handlers::vote))
        .route("/api/tasks/complete", post(handlers::complete_task))
        .route("/api/events", get(handlers::events))
        .with_state(state)
}

use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/projects", get(handlers::list_projects))
        .route(
            "/api/projects/:id/entries",
            get(handlers::list_entries).post(handlers::append_entry),
        )
        .route("/api/projects/:id/entries/:date", put(handlers::correct_entry))
        .route("/api/projects/:id/dashboard", get(handlers::get_dashboard))
        .with_state(state)
}

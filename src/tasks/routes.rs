use super::handlers;
use axum::{
    routing::{get, patch},
    Router,
};

/// Creates the tasks router. Every handler takes `AuthedUser`, so each route
/// answers 401 before touching the store when no one is signed in.
pub fn tasks_routes() -> Router {
    Router::new()
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/:id",
            patch(handlers::update_task).delete(handlers::delete_task),
        )
}

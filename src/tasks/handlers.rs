use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{CreateTaskRequest, TaskResponse, UpdateTaskRequest};
use super::services::TasksService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, ValidJson, ValidPath};

// ============================================================================
// Task CRUD Handlers
// ============================================================================

/// GET /api/tasks - List the caller's tasks
pub async fn list_tasks(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let app_state = state.read().await;
    let tasks_service = TasksService::new(app_state.db.clone());

    let tasks = tasks_service.list(user.id()).await?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /api/tasks - Create a task
pub async fn create_task(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    ValidJson(request): ValidJson<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let tasks_service = TasksService::new(app_state.db.clone());

    let task = tasks_service.create(user.id(), request).await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// PATCH /api/tasks/:id - Update title and/or completed
pub async fn update_task(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    ValidPath(task_id): ValidPath<i64>,
    ValidJson(request): ValidJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let app_state = state.read().await;
    let tasks_service = TasksService::new(app_state.db.clone());

    let task = tasks_service.update(task_id, user.id(), request).await?;

    Ok(Json(TaskResponse::from(task)))
}

/// DELETE /api/tasks/:id - Delete a task
pub async fn delete_task(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    ValidPath(task_id): ValidPath<i64>,
) -> Result<StatusCode, ApiError> {
    let app_state = state.read().await;
    let tasks_service = TasksService::new(app_state.db.clone());

    tasks_service.delete(task_id, user.id()).await?;

    Ok(StatusCode::NO_CONTENT)
}

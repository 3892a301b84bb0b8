use sqlx::SqlitePool;
use tracing::info;

use super::models::{CreateTaskRequest, Task, TaskPatch, UpdateTaskRequest};
use crate::common::{ApiError, Validator};
use crate::store::{StoreError, TaskStore};

/// Task operations, always scoped to the owner handed in by the guard
pub struct TasksService {
    tasks: TaskStore,
}

impl TasksService {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            tasks: TaskStore::new(db),
        }
    }

    pub async fn list(&self, owner_id: i64) -> Result<Vec<Task>, ApiError> {
        Ok(self.tasks.list_tasks(owner_id).await?)
    }

    pub async fn create(&self, owner_id: i64, request: CreateTaskRequest) -> Result<Task, ApiError> {
        request.validate().into_result()?;

        let title = request.title.unwrap_or_default();
        let task = self.tasks.insert_task(owner_id, title.trim()).await?;

        info!(task_id = task.id, user_id = owner_id, "Created task");
        Ok(task)
    }

    /// Sparse update. Another user's task id is reported exactly like a
    /// missing one.
    pub async fn update(
        &self,
        task_id: i64,
        owner_id: i64,
        request: UpdateTaskRequest,
    ) -> Result<Task, ApiError> {
        request.validate().into_result()?;

        let patch = TaskPatch {
            title: request.title.map(|t| t.trim().to_string()),
            completed: request.completed,
        };

        self.tasks
            .update_task(task_id, owner_id, &patch)
            .await
            .map_err(not_found_as_task)
    }

    /// Not idempotent: deleting an id that is already gone is `NotFound`.
    pub async fn delete(&self, task_id: i64, owner_id: i64) -> Result<(), ApiError> {
        self.tasks
            .delete_task(task_id, owner_id)
            .await
            .map_err(not_found_as_task)?;

        info!(task_id, user_id = owner_id, "Deleted task");
        Ok(())
    }
}

fn not_found_as_task(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::NotFound("Task not found".to_string()),
        other => other.into(),
    }
}

//! Task data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Task database model
#[derive(FromRow, Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
}

/// Columns a task update may change. `None` leaves the column untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Public view of a task
#[derive(Serialize, Debug, PartialEq)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            completed: task.completed,
        }
    }
}

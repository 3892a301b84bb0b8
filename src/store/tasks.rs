use chrono::Utc;
use sqlx::SqlitePool;

use super::StoreError;
use crate::tasks::models::{Task, TaskPatch};

const TASK_COLUMNS: &str = "id, user_id, title, completed, created_at";

/// Owner-scoped task queries. There is deliberately no method that takes a
/// task id without an owner id.
#[derive(Clone)]
pub struct TaskStore {
    db: SqlitePool,
}

impl TaskStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn insert_task(&self, owner_id: i64, title: &str) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, completed, created_at)
            VALUES (?, ?, 0, ?)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(title)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.db)
        .await?;

        Ok(task)
    }

    /// All tasks of one owner, oldest first
    pub async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ? ORDER BY id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tasks)
    }

    pub async fn find_task(&self, id: i64, owner_id: i64) -> Result<Task, StoreError> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Apply a patch in a single conditional statement; `NotFound` when no
    /// row matches both id and owner.
    pub async fn update_task(
        &self,
        id: i64,
        owner_id: i64,
        patch: &TaskPatch,
    ) -> Result<Task, StoreError> {
        if patch.is_empty() {
            return self.find_task(id, owner_id).await;
        }

        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks SET
                title = CASE WHEN ? THEN ? ELSE title END,
                completed = CASE WHEN ? THEN ? ELSE completed END
            WHERE id = ? AND user_id = ?
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(patch.title.is_some())
        .bind(patch.title.as_deref())
        .bind(patch.completed.is_some())
        .bind(patch.completed)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Delete by id and owner; `NotFound` when nothing was deleted, including
    /// a repeat delete of the same id.
    pub async fn delete_task(&self, id: i64, owner_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::NewUser;
    use crate::store::test_support::memory_pool;
    use crate::store::UserStore;

    async fn setup() -> (TaskStore, i64, i64) {
        let pool = memory_pool().await;
        let users = UserStore::new(pool.clone());
        let alice = users
            .insert_user(&NewUser::local("alice@example.com".into(), "h".into(), None, None))
            .await
            .unwrap();
        let bob = users
            .insert_user(&NewUser::local("bob@example.com".into(), "h".into(), None, None))
            .await
            .unwrap();
        (TaskStore::new(pool), alice.id, bob.id)
    }

    #[tokio::test]
    async fn test_insert_defaults_to_not_completed() {
        let (store, alice, _) = setup().await;
        let task = store.insert_task(alice, "buy milk").await.unwrap();

        assert_eq!(task.user_id, alice);
        assert_eq!(task.title, "buy milk");
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_queries_are_owner_scoped() {
        let (store, alice, bob) = setup().await;
        let task = store.insert_task(alice, "alice only").await.unwrap();

        assert!(store.list_tasks(bob).await.unwrap().is_empty());
        assert!(matches!(
            store.find_task(task.id, bob).await,
            Err(StoreError::NotFound)
        ));

        let patch = TaskPatch {
            title: None,
            completed: Some(true),
        };
        assert!(matches!(
            store.update_task(task.id, bob, &patch).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete_task(task.id, bob).await,
            Err(StoreError::NotFound)
        ));

        let untouched = store.find_task(task.id, alice).await.unwrap();
        assert!(!untouched.completed);
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let (store, alice, _) = setup().await;
        let task = store.insert_task(alice, "draft").await.unwrap();

        let done = store
            .update_task(
                task.id,
                alice,
                &TaskPatch {
                    title: None,
                    completed: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.title, "draft");
        assert!(done.completed);

        let renamed = store
            .update_task(
                task.id,
                alice,
                &TaskPatch {
                    title: Some("final".into()),
                    completed: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "final");
        assert!(renamed.completed);
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let (store, alice, _) = setup().await;
        let task = store.insert_task(alice, "once").await.unwrap();

        store.delete_task(task.id, alice).await.unwrap();
        assert!(matches!(
            store.delete_task(task.id, alice).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let (store, alice, _) = setup().await;
        let first = store.insert_task(alice, "one").await.unwrap();
        let second = store.insert_task(alice, "two").await.unwrap();

        let ids: Vec<i64> = store
            .list_tasks(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_blank_title_rejected_by_schema() {
        let (store, alice, _) = setup().await;
        assert!(matches!(
            store.insert_task(alice, "   ").await,
            Err(StoreError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_owner_is_not_found() {
        let (store, _, _) = setup().await;
        assert!(matches!(
            store.insert_task(9999, "orphan").await,
            Err(StoreError::NotFound)
        ));
    }
}

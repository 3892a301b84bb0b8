//! Tests for tasks module
//!
//! These tests verify core task functionality including:
//! - Task request validation
//! - Owner-scoped service operations
//! - Public task view

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::auth::models::NewUser;
    use crate::common::{ApiError, Validator};
    use crate::store::test_support::memory_pool;
    use crate::store::UserStore;
    use sqlx::SqlitePool;

    async fn seed_user(db: &SqlitePool, email: &str) -> i64 {
        UserStore::new(db.clone())
            .insert_user(&NewUser::local(
                email.to_string(),
                "not-a-real-hash".to_string(),
                None,
                None,
            ))
            .await
            .unwrap()
            .id
    }

    fn create(title: &str) -> models::CreateTaskRequest {
        models::CreateTaskRequest {
            title: Some(title.to_string()),
        }
    }

    #[test]
    fn test_create_validation_requires_title() {
        let missing = models::CreateTaskRequest { title: None };
        assert!(!missing.validate().is_valid);

        let blank = create("   ");
        assert!(!blank.validate().is_valid, "Whitespace title should fail");

        assert!(create("Buy milk").validate().is_valid);
    }

    #[test]
    fn test_create_validation_title_length() {
        let at_limit = create(&"a".repeat(validators::MAX_TITLE_CHARS));
        assert!(at_limit.validate().is_valid);

        let too_long = create(&"a".repeat(validators::MAX_TITLE_CHARS + 1));
        assert!(!too_long.validate().is_valid);
    }

    #[test]
    fn test_update_validation() {
        let empty = models::UpdateTaskRequest::default();
        let result = empty.validate();
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].message, "No valid fields to update");

        let blank_title = models::UpdateTaskRequest {
            title: Some("".to_string()),
            completed: None,
        };
        assert!(!blank_title.validate().is_valid);

        let only_completed = models::UpdateTaskRequest {
            title: None,
            completed: Some(true),
        };
        assert!(only_completed.validate().is_valid);
    }

    #[test]
    fn test_update_request_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<models::UpdateTaskRequest>(
            r#"{"completed": true, "user_id": 99}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_task_response_hides_owner() {
        let task = models::Task {
            id: 3,
            user_id: 1,
            title: "Write report".to_string(),
            completed: false,
            created_at: "2024-01-01 00:00:00".to_string(),
        };

        let json = serde_json::to_value(models::TaskResponse::from(task)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "title": "Write report", "completed": false})
        );
    }

    #[tokio::test]
    async fn test_create_trims_title() {
        let db = memory_pool().await;
        let alice = seed_user(&db, "alice@example.com").await;
        let service = services::TasksService::new(db);

        let task = service.create(alice, create("  Buy milk  ")).await.unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_invalid_create_persists_nothing() {
        let db = memory_pool().await;
        let alice = seed_user(&db, "alice@example.com").await;
        let service = services::TasksService::new(db);

        let err = service.create(alice, create("")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(service.list(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_users_task_is_not_found() {
        let db = memory_pool().await;
        let alice = seed_user(&db, "alice@example.com").await;
        let bob = seed_user(&db, "bob@example.com").await;
        let service = services::TasksService::new(db);

        let task = service.create(alice, create("Alice only")).await.unwrap();

        let patch = models::UpdateTaskRequest {
            title: None,
            completed: Some(true),
        };
        let err = service.update(task.id, bob, patch).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Task not found"));

        let err = service.delete(task.id, bob).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        assert!(service.list(bob).await.unwrap().is_empty());
        let remaining = service.list(alice).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(!remaining[0].completed);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = memory_pool().await;
        let alice = seed_user(&db, "alice@example.com").await;
        let service = services::TasksService::new(db);

        let task = service.create(alice, create("Buy milk")).await.unwrap();

        let done = service
            .update(
                task.id,
                alice,
                models::UpdateTaskRequest {
                    title: None,
                    completed: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.title, "Buy milk");
        assert!(done.completed);

        let renamed = service
            .update(
                task.id,
                alice,
                models::UpdateTaskRequest {
                    title: Some(" Buy oat milk ".to_string()),
                    completed: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "Buy oat milk");
        assert!(renamed.completed);
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let db = memory_pool().await;
        let alice = seed_user(&db, "alice@example.com").await;
        let service = services::TasksService::new(db);

        let task = service.create(alice, create("Once")).await.unwrap();
        service.delete(task.id, alice).await.unwrap();

        let err = service.delete(task.id, alice).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}

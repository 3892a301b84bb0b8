//! # Persistence Store
//!
//! Narrow interface over the SQLite pool. Every task statement filters on the
//! owning user id, and conditional mutations are single statements whose
//! affected rows decide between success and `NotFound`.

pub mod tasks;
pub mod users;

use thiserror::Error;

pub use tasks::TaskStore;
pub use users::UserStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("uniqueness violation: {0}")]
    Conflict(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.message().to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                StoreError::NotFound
            }
            sqlx::Error::Database(ref db_err) if db_err.is_check_violation() => {
                StoreError::Constraint(db_err.message().to_string())
            }
            other => StoreError::Unavailable(other),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

    use crate::common::migrations::run_migrations;

    /// Single-connection in-memory database with the full schema
    pub async fn memory_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .unwrap();
        run_migrations(&pool, false).await.unwrap();
        pool
    }
}

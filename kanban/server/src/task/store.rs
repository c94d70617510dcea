//! Storage interface behind the task service.
//!
//! Two implementations exist: [`SqlTaskStore`](super::SqlTaskStore) over the relational
//! database and [`InMemoryTaskStore`](super::InMemoryTaskStore) for tests and offline use.
//! Which one backs the application is decided once at startup.

use async_trait::async_trait;

use super::{Task, TaskStatus};

/// Errors raised by a [`TaskStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// A stored row carries a status outside of todo, doing and done.
    #[error("Task {id} has unrecognised status '{status}'")]
    InvalidStatus { id: i64, status: String },
    /// A row disappeared between a write and the read that follows it.
    #[error("Task {0} could not be read back after write")]
    MissingAfterWrite(i64),
    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("In-memory task store is poisoned")]
    Poisoned,
}

/// Persistence operations for tasks.
///
/// Implementations perform no validation; callers go through
/// [`TaskService`](super::TaskService).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns every task ordered by creation time descending, ties broken by ID descending.
    async fn list_newest_first(&self) -> Result<Vec<Task>, StoreError>;

    /// Inserts a task with status `todo` and returns it as stored.
    async fn insert(&self, title: &str) -> Result<Task, StoreError>;

    /// Sets the status of a task and returns it as stored, or `None` if no task has `id`.
    async fn set_status(&self, id: i64, status: TaskStatus) -> Result<Option<Task>, StoreError>;

    /// Deletes a task. Returns `false` if no task has `id`.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Finds a task by its ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, StoreError>;
}

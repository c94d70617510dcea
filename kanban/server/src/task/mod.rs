use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

pub mod memory_store;
pub mod sql_store;
pub mod store;
pub mod web;

pub use memory_store::InMemoryTaskStore;
pub use sql_store::SqlTaskStore;
pub use store::{StoreError, TaskStore};

const TITLE_REQUIRED: &str = "title required";
const INVALID_TASK_ID: &str = "invalid task id";
const INVALID_TASK_STATUS: &str = "invalid task status: must be one of todo, doing, done";

/// The column a task currently sits in.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    /// Every status, in board order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    /// Returns the stored form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `todo`, `doing` or `done`.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status '{0}'")]
pub struct UnknownTaskStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownTaskStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            other => Err(UnknownTaskStatus(other.to_string())),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: i64,
    title: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: i64, title: String, status: TaskStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            status,
            created_at,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the current status of the task.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns when the task was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// The caller supplied a malformed title, id or status.
    #[error("{0}")]
    Validation(String),
    /// A well-formed id that does not reference an existing task.
    #[error("Task with ID {0} not found")]
    NotFound(i64),
    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Validating front for a [`TaskStore`].
///
/// Any status may be set from any other status. The todo, doing, done cycle
/// offered on the board is a presentation choice and is not enforced here.
pub struct TaskService<'a> {
    store: &'a dyn TaskStore,
}

impl TaskService<'_> {
    pub fn new(store: &dyn TaskStore) -> TaskService<'_> {
        TaskService { store }
    }

    /// Retrieves all tasks, newest first.
    ///
    /// # Returns
    ///
    /// A `Result` containing every task ordered by creation time descending, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.store.list_newest_first().await?)
    }

    /// Creates a new task in the `todo` column.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the task. Surrounding whitespace is removed before storing.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` with its generated ID and creation time.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, title: &str) -> Result<Task, TaskServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskServiceError::Validation(TITLE_REQUIRED.to_string()));
        }

        let task = self.store.insert(title).await?;
        tracing::info!("Created task {} with title '{}'", task.id(), task.title());
        Ok(task)
    }

    /// Moves a task to another column.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `status` - The new status, one of `todo`, `doing` or `done`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the task as it is stored after the change.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_status(&self, id: i64, status: &str) -> Result<Task, TaskServiceError> {
        validate_id(id)?;
        let status: TaskStatus = status
            .parse()
            .map_err(|_| TaskServiceError::Validation(INVALID_TASK_STATUS.to_string()))?;

        let task = self
            .store
            .set_status(id, status)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;
        tracing::info!("Moved task {} to {}", id, status);
        Ok(task)
    }

    /// Permanently deletes a task.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: i64) -> Result<(), TaskServiceError> {
        validate_id(id)?;
        if !self.store.delete(id).await? {
            return Err(TaskServiceError::NotFound(id));
        }
        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    /// Looks up a task without committing to an error path.
    ///
    /// Returns `None` for IDs that can never match a row, for missing tasks, and when the
    /// store cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: i64) -> Option<Task> {
        if id <= 0 {
            return None;
        }
        match self.store.find_by_id(id).await {
            Ok(task) => task,
            Err(err) => {
                tracing::error!("Failed to look up task {}: {}", id, err);
                None
            }
        }
    }
}

fn validate_id(id: i64) -> Result<(), TaskServiceError> {
    if id <= 0 {
        return Err(TaskServiceError::Validation(INVALID_TASK_ID.to_string()));
    }
    Ok(())
}

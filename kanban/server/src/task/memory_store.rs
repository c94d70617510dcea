use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::store::{StoreError, TaskStore};
use super::{Task, TaskStatus};

/// Task store that keeps everything in process memory.
///
/// IDs come from a counter that only moves forward, so a deleted task's ID is never handed out
/// again for the lifetime of the store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    tasks: BTreeMap<i64, Task>,
    last_id: i64,
}

impl InMemoryState {
    fn push(&mut self, title: String, status: TaskStatus, age: Duration) -> Task {
        self.last_id += 1;
        let task = Task::new(self.last_id, title, status, Utc::now() - age);
        self.tasks.insert(task.id(), task.clone());
        task
    }
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with a handful of demo tasks spread across the board.
    pub fn with_demo_tasks() -> Self {
        let demo_tasks = [
            ("Set up project structure", TaskStatus::Done, Duration::days(7)),
            ("Create board templates", TaskStatus::Done, Duration::days(6)),
            ("Implement task creation form", TaskStatus::Doing, Duration::days(3)),
            ("Add task status updates", TaskStatus::Doing, Duration::days(2)),
            ("Style the UI components", TaskStatus::Todo, Duration::days(1)),
            ("Connect to database", TaskStatus::Todo, Duration::hours(12)),
        ];

        let mut state = InMemoryState::default();
        for (title, status, age) in demo_tasks {
            state.push(title.to_string(), status, age);
        }
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_newest_first(&self) -> Result<Vec<Task>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        let mut tasks: Vec<Task> = state.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(tasks)
    }

    async fn insert(&self, title: &str) -> Result<Task, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        Ok(state.push(title.to_string(), TaskStatus::Todo, Duration::zero()))
    }

    async fn set_status(&self, id: i64, status: TaskStatus) -> Result<Option<Task>, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let Some(existing) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };
        existing.status = status;
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        Ok(state.tasks.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }
}

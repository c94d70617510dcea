use askama::Template;
use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::task::{Task, TaskService, TaskServiceError, TaskStatus, TaskStore};

/// Fields submitted by the forms on the board. Which ones are required depends on `intent`.
#[derive(Debug, Default, Deserialize)]
pub struct BoardForm {
    intent: Option<String>,
    title: Option<String>,
    #[serde(rename = "taskId")]
    task_id: Option<String>,
    status: Option<String>,
}

/// A mutation requested through the board.
#[derive(Debug, PartialEq, Eq)]
enum BoardAction {
    Create { title: String },
    UpdateStatus { task_id: i64, status: String },
    Delete { task_id: i64 },
}

impl TryFrom<BoardForm> for BoardAction {
    type Error = BoardError;

    fn try_from(form: BoardForm) -> Result<Self, Self::Error> {
        match form.intent.as_deref() {
            Some("create") => {
                let title = form.title.ok_or(BoardError::BadRequest("Task title is required"))?;
                Ok(BoardAction::Create { title })
            }
            Some("updateStatus") => {
                let (Some(task_id), Some(status)) = (form.task_id, form.status) else {
                    return Err(BoardError::BadRequest("Task ID and status are required"));
                };
                Ok(BoardAction::UpdateStatus {
                    task_id: parse_task_id(&task_id)?,
                    status,
                })
            }
            Some("delete") => {
                let task_id = form.task_id.ok_or(BoardError::BadRequest("Task ID is required"))?;
                Ok(BoardAction::Delete {
                    task_id: parse_task_id(&task_id)?,
                })
            }
            _ => Err(BoardError::BadRequest("Invalid action")),
        }
    }
}

fn parse_task_id(raw: &str) -> Result<i64, BoardError> {
    raw.trim()
        .parse()
        .map_err(|_| BoardError::BadRequest("Invalid task ID"))
}

/// Custom error type for board handler operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The submitted form is missing fields or carries unparseable values.
    #[error("{0}")]
    BadRequest(&'static str),
    /// Represents a task service error.
    #[error("Task service error: {0}")]
    Service(#[from] TaskServiceError),
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let (status_code, user_facing_error_message) = match &self {
            BoardError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.to_string()),
            BoardError::Service(TaskServiceError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            BoardError::Service(err @ TaskServiceError::NotFound(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            BoardError::Service(TaskServiceError::Storage(_)) | BoardError::Template(_) => {
                tracing::error!("Board request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while processing your request".to_string(),
                )
            }
        };

        let error_template = ErrorMessageTemplate::new(user_facing_error_message);
        let Ok(rendered) = error_template.render() else {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };
        (status_code, Html(rendered)).into_response()
    }
}

/// Status a card's button moves the task to.
fn next_status(status: TaskStatus) -> TaskStatus {
    match status {
        TaskStatus::Todo => TaskStatus::Doing,
        TaskStatus::Doing => TaskStatus::Done,
        TaskStatus::Done => TaskStatus::Todo,
    }
}

fn next_status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "Start",
        TaskStatus::Doing => "Complete",
        TaskStatus::Done => "Reset",
    }
}

/// A task as shown on the board.
#[derive(Debug, PartialEq, Eq)]
struct TaskCard {
    id: i64,
    title: String,
    created_on: String,
    next_status: &'static str,
    next_status_label: &'static str,
}

impl From<Task> for TaskCard {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            created_on: task.created_at().format("%Y-%m-%d").to_string(),
            next_status: next_status(task.status()).as_str(),
            next_status_label: next_status_label(task.status()),
            title: task.title().to_string(),
        }
    }
}

#[derive(Debug)]
struct BoardColumn {
    heading: &'static str,
    badge_class: &'static str,
    empty_message: &'static str,
    tasks: Vec<TaskCard>,
}

impl BoardColumn {
    fn new(status: TaskStatus) -> Self {
        let (heading, badge_class, empty_message) = match status {
            TaskStatus::Todo => ("To Do", "badge-todo", "No tasks yet"),
            TaskStatus::Doing => ("Doing", "badge-doing", "No tasks in progress"),
            TaskStatus::Done => ("Done", "badge-done", "No completed tasks"),
        };
        Self {
            heading,
            badge_class,
            empty_message,
            tasks: Vec::new(),
        }
    }
}

/// Splits a newest-first task list into the three board columns, keeping list order in each.
fn group_by_status(tasks: Vec<Task>) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = TaskStatus::ALL.into_iter().map(BoardColumn::new).collect();
    for task in tasks {
        let index = match task.status() {
            TaskStatus::Todo => 0,
            TaskStatus::Doing => 1,
            TaskStatus::Done => 2,
        };
        columns[index].tasks.push(TaskCard::from(task));
    }
    columns
}

#[derive(Template)]
#[template(path = "board.html")]
struct BoardTemplate {
    columns: Vec<BoardColumn>,
}

impl BoardTemplate {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            columns: group_by_status(tasks),
        }
    }
}

#[derive(Template)]
#[template(path = "error_message.html")]
struct ErrorMessageTemplate {
    message: String,
}

impl ErrorMessageTemplate {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

#[derive(Clone)]
pub struct BoardState {
    pub store: Arc<dyn TaskStore>,
}

/// Handler for GET / that renders every task grouped by status.
#[tracing::instrument(skip(state))]
async fn board_handler(State(state): State<Arc<BoardState>>) -> Result<Html<String>, BoardError> {
    let task_service = TaskService::new(state.store.as_ref());
    let tasks = task_service.get_all_tasks().await?;
    let template = BoardTemplate::new(tasks);
    template.render().map(Html).map_err(BoardError::from)
}

/// Handler for POST / that applies the submitted action and sends the browser back to the board.
#[tracing::instrument(skip(state))]
async fn board_action_handler(
    State(state): State<Arc<BoardState>>,
    form: Result<Form<BoardForm>, FormRejection>,
) -> Result<Redirect, BoardError> {
    let Form(form) = form.map_err(|rejection| {
        tracing::warn!("Unreadable board form: {}", rejection);
        BoardError::BadRequest("Invalid action")
    })?;
    let action = BoardAction::try_from(form).inspect_err(|err| {
        tracing::warn!("Rejected board form: {}", err);
    })?;
    let task_service = TaskService::new(state.store.as_ref());

    match action {
        BoardAction::Create { title } => {
            task_service.create_task(&title).await?;
        }
        BoardAction::UpdateStatus { task_id, status } => {
            task_service.update_task_status(task_id, &status).await?;
        }
        BoardAction::Delete { task_id } => {
            task_service.delete_task_by_id(task_id).await?;
        }
    }
    Ok(Redirect::to("/"))
}

/// Creates and returns the board router.
pub fn create_board_router(state: Arc<BoardState>) -> Router {
    Router::new()
        .route("/", get(board_handler).post(board_action_handler))
        .with_state(state)
}

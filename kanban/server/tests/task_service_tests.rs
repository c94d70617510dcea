use chrono::NaiveDate;
use kanban_server::entities::task;
use kanban_server::task::{
    InMemoryTaskStore, SqlTaskStore, TaskService, TaskServiceError, TaskStatus, TaskStore,
};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};

mod common;

pub struct TestContext {
    pub db: DatabaseConnection,
    pub store: SqlTaskStore,
}

async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let db = common::setup_db().await?;
    let store = SqlTaskStore::new(db.clone());
    Ok(TestContext { db, store })
}

async fn insert_task_created_at(
    db: &DatabaseConnection,
    title: &str,
    status: &str,
    day: u32,
) -> task::Model {
    let active_model = task::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        status: ActiveValue::Set(status.to_string()),
        created_at: ActiveValue::Set(
            NaiveDate::from_ymd_opt(2025, 8, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        ),
        ..Default::default()
    };
    active_model
        .insert(db)
        .await
        .expect("Failed to insert task")
}

/// Walks a single task through its whole life on the given store.
async fn run_full_lifecycle(store: &dyn TaskStore) {
    let task_service = TaskService::new(store);

    let created = task_service
        .create_task("Write docs")
        .await
        .expect("Failed to create task");
    assert_eq!(created.status(), TaskStatus::Todo);
    let tasks = task_service.get_all_tasks().await.unwrap();
    assert_eq!(tasks.first(), Some(&created));

    let doing = task_service
        .update_task_status(created.id(), "doing")
        .await
        .expect("Failed to move task to doing");
    assert_eq!(doing.status(), TaskStatus::Doing);
    let tasks = task_service.get_all_tasks().await.unwrap();
    assert_eq!(tasks.first().map(|task| task.status()), Some(TaskStatus::Doing));

    task_service
        .update_task_status(created.id(), "done")
        .await
        .expect("Failed to move task to done");
    let tasks = task_service.get_all_tasks().await.unwrap();
    assert_eq!(tasks.first().map(|task| task.status()), Some(TaskStatus::Done));

    task_service
        .delete_task_by_id(created.id())
        .await
        .expect("Failed to delete task");
    let tasks = task_service.get_all_tasks().await.unwrap();
    assert!(tasks.iter().all(|task| task.id() != created.id()));
    assert_eq!(task_service.get_task_by_id(created.id()).await, None);
}

/// Checks the not-found and validation paths on the given store.
async fn run_rejections(store: &dyn TaskStore) {
    let task_service = TaskService::new(store);
    let created = task_service.create_task("Existing").await.unwrap();

    assert!(matches!(
        task_service.create_task("   ").await,
        Err(TaskServiceError::Validation(_))
    ));
    assert!(matches!(
        task_service.update_task_status(created.id(), "invalid").await,
        Err(TaskServiceError::Validation(_))
    ));
    assert!(matches!(
        task_service.update_task_status(999999, "doing").await,
        Err(TaskServiceError::NotFound(999999))
    ));
    assert!(matches!(
        task_service.delete_task_by_id(999999).await,
        Err(TaskServiceError::NotFound(999999))
    ));
    assert_eq!(task_service.get_task_by_id(999999).await, None);

    let unchanged = task_service.get_task_by_id(created.id()).await;
    assert_eq!(unchanged, Some(created));
}

#[tokio::test]
async fn can_run_full_lifecycle_on_sqlite() {
    let state = setup().await.expect("Failed to setup test context");
    run_full_lifecycle(&state.store).await;
}

#[tokio::test]
async fn can_run_full_lifecycle_in_memory() {
    let store = InMemoryTaskStore::new();
    run_full_lifecycle(&store).await;
}

#[tokio::test]
async fn can_reject_bad_requests_on_sqlite() {
    let state = setup().await.expect("Failed to setup test context");
    run_rejections(&state.store).await;
}

#[tokio::test]
async fn can_reject_bad_requests_in_memory() {
    let store = InMemoryTaskStore::new();
    run_rejections(&store).await;
}

#[tokio::test]
async fn can_create_task_with_trimmed_title() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.store);

    let created = task_service
        .create_task("  Write docs \n")
        .await
        .expect("Failed to create task");

    assert!(created.id() > 0);
    assert_eq!(created.title(), "Write docs");
    assert_eq!(created.status(), TaskStatus::Todo);
    assert_eq!(task_service.get_task_by_id(created.id()).await, Some(created));
}

#[tokio::test]
async fn can_list_tasks_newest_first() {
    let state = setup().await.expect("Failed to setup test context");
    let first = insert_task_created_at(&state.db, "T1", "todo", 1).await;
    let third = insert_task_created_at(&state.db, "T3", "done", 3).await;
    let second = insert_task_created_at(&state.db, "T2", "doing", 2).await;
    let task_service = TaskService::new(&state.store);

    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");

    let ids: Vec<i64> = tasks.iter().map(|task| task.id()).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn can_order_same_second_tasks_by_insertion() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.store);

    let first = task_service.create_task("First").await.unwrap();
    let second = task_service.create_task("Second").await.unwrap();
    let third = task_service.create_task("Third").await.unwrap();

    let tasks = task_service.get_all_tasks().await.unwrap();
    assert_eq!(tasks, vec![third, second, first]);
}

#[tokio::test]
async fn can_handle_empty_task_list() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.store);

    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");

    assert!(tasks.is_empty());
}

#[tokio::test]
async fn can_update_status_without_touching_other_fields() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.store);
    let created = task_service.create_task("Write docs").await.unwrap();

    let updated = task_service
        .update_task_status(created.id(), "doing")
        .await
        .expect("Failed to update task status");

    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.title(), created.title());
    assert_eq!(updated.created_at(), created.created_at());
    assert_eq!(updated.status(), TaskStatus::Doing);
}

#[tokio::test]
async fn can_jump_between_any_statuses() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.store);
    let created = task_service.create_task("Write docs").await.unwrap();

    for status in ["done", "doing", "doing", "todo", "done"] {
        let updated = task_service
            .update_task_status(created.id(), status)
            .await
            .expect("Failed to update task status");
        assert_eq!(updated.status().as_str(), status);
    }
}

#[tokio::test]
async fn can_delete_only_the_requested_task() {
    let state = setup().await.expect("Failed to setup test context");
    let keep_first = insert_task_created_at(&state.db, "Keep me", "doing", 1).await;
    let remove = insert_task_created_at(&state.db, "Remove me", "todo", 2).await;
    let keep_second = insert_task_created_at(&state.db, "Keep me too", "done", 3).await;
    let task_service = TaskService::new(&state.store);

    task_service
        .delete_task_by_id(remove.id)
        .await
        .expect("Failed to delete task");

    let tasks = task_service.get_all_tasks().await.unwrap();
    let remaining: Vec<(i64, &str, &str)> = tasks
        .iter()
        .map(|task| (task.id(), task.title(), task.status().as_str()))
        .collect();
    assert_eq!(
        remaining,
        vec![
            (keep_second.id, "Keep me too", "done"),
            (keep_first.id, "Keep me", "doing"),
        ]
    );
    assert!(matches!(
        task_service.delete_task_by_id(remove.id).await,
        Err(TaskServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn can_not_reuse_ids_after_delete() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.store);
    let first = task_service.create_task("First").await.unwrap();
    let second = task_service.create_task("Second").await.unwrap();
    task_service.delete_task_by_id(second.id()).await.unwrap();

    let third = task_service.create_task("Third").await.unwrap();

    assert!(third.id() > second.id());
    assert!(second.id() > first.id());
}

#[tokio::test]
async fn can_reject_unknown_status_at_database_level() {
    let state = setup().await.expect("Failed to setup test context");
    let active_model = task::ActiveModel {
        title: ActiveValue::Set("Sneaky".to_string()),
        status: ActiveValue::Set("archived".to_string()),
        ..Default::default()
    };

    let result = active_model.insert(&state.db).await;

    assert!(result.is_err());
    let tasks = TaskService::new(&state.store).get_all_tasks().await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn can_probe_with_non_positive_ids() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.store);

    assert_eq!(task_service.get_task_by_id(0).await, None);
    assert_eq!(task_service.get_task_by_id(-1).await, None);
    assert_eq!(task_service.get_task_by_id(i64::MIN).await, None);
}

#[tokio::test]
async fn can_report_storage_error_when_database_is_closed() {
    let state = setup().await.expect("Failed to setup test context");
    let store = state.store.clone();
    state.db.close().await.expect("Failed to close database");
    let task_service = TaskService::new(&store);

    assert!(matches!(
        task_service.get_all_tasks().await,
        Err(TaskServiceError::Storage(_))
    ));
    assert!(matches!(
        task_service.create_task("Write docs").await,
        Err(TaskServiceError::Storage(_))
    ));
    assert_eq!(task_service.get_task_by_id(1).await, None);
}

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use super::store::{StoreError, TaskStore};
use super::{Task, TaskStatus};
use crate::entities::task;

/// Task store backed by the `tasks` table.
#[derive(Clone, Debug)]
pub struct SqlTaskStore {
    db: DatabaseConnection,
}

impl SqlTaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl TryFrom<task::Model> for Task {
    type Error = StoreError;

    fn try_from(model: task::Model) -> Result<Self, Self::Error> {
        let status = model.status.parse().map_err(|_| StoreError::InvalidStatus {
            id: model.id,
            status: model.status.clone(),
        })?;
        Ok(Task::new(
            model.id,
            model.title,
            status,
            model.created_at.and_utc(),
        ))
    }
}

#[async_trait]
impl TaskStore for SqlTaskStore {
    #[tracing::instrument(skip(self))]
    async fn list_newest_first(&self) -> Result<Vec<Task>, StoreError> {
        task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .order_by_desc(task::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, title: &str) -> Result<Task, StoreError> {
        // created_at is filled in by the column default
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(title.to_string()),
            status: ActiveValue::Set(TaskStatus::Todo.as_str().to_string()),
            ..Default::default()
        };
        let created_model = active_model.insert(&self.db).await?;
        Task::try_from(created_model)
    }

    #[tracing::instrument(skip(self))]
    async fn set_status(&self, id: i64, status: TaskStatus) -> Result<Option<Task>, StoreError> {
        let txn = self.db.begin().await?;

        let result = task::Entity::update_many()
            .col_expr(task::Column::Status, Expr::value(status.as_str()))
            .filter(task::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let updated_model = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(StoreError::MissingAfterWrite(id))?;
        txn.commit().await?;

        Task::try_from(updated_model).map(Some)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = task::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, StoreError> {
        task::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Task::try_from)
            .transpose()
    }
}

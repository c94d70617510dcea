//! The long-lived handle on the backing store.
//!
//! The process entry point opens exactly one [`StoreHandle`], hands the task store it provides
//! to the router, and closes it once the server has stopped.

use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::config::{Config, StorageKind};
use crate::task::{InMemoryTaskStore, SqlTaskStore, TaskStore};

pub enum StoreHandle {
    Sql(DatabaseConnection),
    InMemory(InMemoryTaskStore),
}

impl StoreHandle {
    /// Opens the store selected by `config.storage`.
    #[tracing::instrument(skip(config))]
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        match config.storage {
            StorageKind::Sqlite => {
                let db = connect(&config.database_url).await?;
                tracing::info!("Database migrations applied successfully");
                Ok(StoreHandle::Sql(db))
            }
            StorageKind::Memory => {
                tracing::warn!("Using the in-memory task store, tasks will not survive a restart");
                let store = if config.demo_tasks {
                    InMemoryTaskStore::with_demo_tasks()
                } else {
                    InMemoryTaskStore::new()
                };
                Ok(StoreHandle::InMemory(store))
            }
        }
    }

    /// Returns the task store backed by this handle.
    pub fn task_store(&self) -> Arc<dyn TaskStore> {
        match self {
            StoreHandle::Sql(db) => Arc::new(SqlTaskStore::new(db.clone())),
            StoreHandle::InMemory(store) => Arc::new(store.clone()),
        }
    }

    /// Releases the handle. Failures are logged, not returned.
    #[tracing::instrument(skip(self))]
    pub async fn close(self) {
        let StoreHandle::Sql(db) = self else {
            return;
        };
        match db.close().await {
            Ok(()) => tracing::info!("Database connection closed"),
            Err(err) => tracing::error!("Failed to close database connection: {}", err),
        }
    }
}

/// Connects to the database with a single pooled connection and brings the schema up to date.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

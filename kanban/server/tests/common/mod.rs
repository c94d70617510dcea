use sea_orm::DatabaseConnection;

/// Opens a fresh in-memory SQLite database with the schema applied.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    let db = kanban_server::storage::connect("sqlite::memory:").await?;
    Ok(db)
}

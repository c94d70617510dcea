use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Status,
    CreatedAt,
}

const TASK_STATUSES: [&str; 3] = ["todo", "doing", "done"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(text(Tasks::Title))
                    .col(
                        text(Tasks::Status)
                            .check(Expr::col(Tasks::Status).is_in(TASK_STATUSES)),
                    )
                    .col(
                        ColumnDef::new(Tasks::CreatedAt)
                            .custom(Alias::new("DATETIME"))
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_TODO_TITLE_UNIQUE: &str = "idx-todo-title-unique";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Titles are unique at the storage level so concurrent creates cannot both land.
        manager
            .create_index(
                Index::create()
                    .name(IDX_TODO_TITLE_UNIQUE)
                    .table(Todo::Table)
                    .col(Todo::Title)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(IDX_TODO_TITLE_UNIQUE).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Todo {
    Table,
    Title,
}

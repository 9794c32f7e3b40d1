use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// (table, column) pairs the index endpoints can sort on
const SORT_COLUMNS: &[(&str, &str)] = &[
    ("customers", "name"),
    ("customers", "created_at"),
    ("tickets", "created_at"),
    ("tickets", "updated_at"),
    ("tickets", "due_at"),
    ("objectives", "created_at"),
    ("kb_articles", "published_at"),
    ("kb_articles", "updated_at"),
    ("bookable_task_types", "name"),
];

fn index_name(table: &str, column: &str) -> String {
    format!("{table}_{column}")
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (table, column) in SORT_COLUMNS {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(index_name(table, column))
                        .table((Alias::new("bizops"), Alias::new(*table)))
                        .col(Alias::new(*column))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (table, column) in SORT_COLUMNS {
            manager
                .drop_index(
                    Index::drop()
                        .if_exists()
                        .name(index_name(table, column))
                        .table((Alias::new("bizops"), Alias::new(*table)))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MigrationVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MigrationVersions::Version)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MigrationVersions::ExecutedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MigrationVersions::Direction)
                            .string_len(16)
                            .not_null()
                            .default("UP"),
                    )
                    .col(ColumnDef::new(MigrationVersions::ExecutionTimeMs).big_integer())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MigrationVersions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MigrationVersions {
    Table,
    Version,
    ExecutedAt,
    Direction,
    ExecutionTimeMs,
}

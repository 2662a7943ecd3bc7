use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MigrationLocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MigrationLocks::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MigrationLocks::Owner).string_len(64).not_null())
                    .col(
                        ColumnDef::new(MigrationLocks::AcquiredAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MigrationLocks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MigrationLocks {
    Table,
    Id,
    Owner,
    AcquiredAt,
}

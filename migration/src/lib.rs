pub use sea_orm_migration::prelude::*;

mod m20261002_101512_create_migration_versions_table;
mod m20261002_103344_create_migration_locks_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261002_101512_create_migration_versions_table::Migration),
            Box::new(m20261002_103344_create_migration_locks_table::Migration),
        ]
    }
}

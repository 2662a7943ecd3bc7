use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tracing::{error, info};

/// Creates or upgrades the `migration_versions` and `migration_locks` tables.
pub async fn up(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    info!("Preparing metadata tables");
    match migration::Migrator::up(db, None).await {
        Ok(_) => {
            info!("Metadata tables are ready");
            Ok(())
        }
        Err(e) => {
            error!("Failed to prepare metadata tables: {}", e);
            Err(e)
        }
    }
}

pub async fn down(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    info!("Dropping metadata tables");
    match migration::Migrator::down(db, None).await {
        Ok(_) => {
            info!("Metadata tables dropped");
            Ok(())
        }
        Err(e) => {
            error!("Failed to drop metadata tables: {}", e);
            Err(e)
        }
    }
}

pub mod migration_service;

use anyhow::{Context, Result};
use sea_orm::ConnectionTrait;
use std::sync::Arc;
use tracing::debug;

pub use migration_service::{
    MigrateOptions, MigrateOutcome, MigrationService, StatusReport, StatusRow,
};

use crate::{
    config::Settings,
    db::init_db,
    executor::{CancelSignal, DatabaseExecutor},
    registry::{MigrationRegistry, PackageRoots},
    repo::{MigrationLockRepository, MigrationVersionRepository},
    types::Platform,
};

pub struct AppServices {
    pub migration_service: MigrationService,
}

impl AppServices {
    pub async fn new(settings: &Settings, cancel: CancelSignal) -> Result<Self> {
        let db = init_db(settings)
            .await
            .context("Failed to initialize database")?;

        let platform = settings
            .migrations
            .platform
            .unwrap_or_else(|| Platform::from(db.get_database_backend()));
        debug!("Using platform {}", platform);

        let roots = Arc::new(PackageRoots::new(
            settings.migrations.packages_dir.clone(),
            settings.migrations.extra_roots.clone(),
        ));

        Ok(Self {
            migration_service: MigrationService::new(
                MigrationRegistry::new(roots, platform),
                Arc::new(MigrationVersionRepository::new(db.clone())),
                Arc::new(DatabaseExecutor::new(db.clone())),
                Arc::new(MigrationLockRepository::new(db)),
                cancel,
                settings.migrations.staging_dir.clone(),
                settings.database.redacted_url(),
            ),
        })
    }
}

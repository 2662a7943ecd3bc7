use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder};
use tracing::{debug, warn};

use crate::{
    entities::{MigrationVersionActiveModel, MigrationVersionColumn, MigrationVersionsEntity},
    errors::MigrationError,
    metadata::{ExecutedMigrationRecord, ExecutedSet, MetadataStore},
    types::{Direction, MigrationId},
    utils::time::elapsed_millis,
};

/// Metadata store backed by the `migration_versions` table.
pub struct MigrationVersionRepository {
    db: DatabaseConnection,
}

impl MigrationVersionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn exists(&self, id: &MigrationId) -> Result<bool, MigrationError> {
        exists(&self.db, id).await
    }
}

async fn exists<C: ConnectionTrait>(db: &C, id: &MigrationId) -> Result<bool, MigrationError> {
    Ok(MigrationVersionsEntity::find_by_id(id.to_string())
        .one(db)
        .await?
        .is_some())
}

/// Inserts the record for `id` on `db`, which may be an open transaction.
pub async fn insert_record<C: ConnectionTrait>(
    db: &C,
    id: &MigrationId,
    execution_time: Option<Duration>,
) -> Result<(), MigrationError> {
    if exists(db, id).await? {
        return Err(MigrationError::VersionAlreadyExists(id.clone()));
    }

    let active_model = MigrationVersionActiveModel {
        version: Set(id.to_string()),
        executed_at: Set(chrono::Utc::now().naive_utc()),
        direction: Set(Direction::Up),
        execution_time_ms: Set(execution_time.map(elapsed_millis)),
    };
    MigrationVersionsEntity::insert(active_model)
        .exec_without_returning(db)
        .await?;
    debug!("Recorded {} as executed", id);
    Ok(())
}

/// Deletes the record for `id` on `db`, which may be an open transaction.
pub async fn delete_record<C: ConnectionTrait>(
    db: &C,
    id: &MigrationId,
) -> Result<(), MigrationError> {
    let res = MigrationVersionsEntity::delete_by_id(id.to_string())
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(MigrationError::VersionDoesNotExist(id.clone()));
    }
    debug!("Removed {} from the version table", id);
    Ok(())
}

#[async_trait]
impl MetadataStore for MigrationVersionRepository {
    async fn record_applied(
        &self,
        id: &MigrationId,
        execution_time: Option<Duration>,
    ) -> Result<(), MigrationError> {
        insert_record(&self.db, id, execution_time).await
    }

    async fn record_reverted(&self, id: &MigrationId) -> Result<(), MigrationError> {
        delete_record(&self.db, id).await
    }

    async fn list_executed(&self) -> Result<ExecutedSet, MigrationError> {
        let models = MigrationVersionsEntity::find()
            .order_by_asc(MigrationVersionColumn::Version)
            .all(&self.db)
            .await?;

        let mut records = Vec::with_capacity(models.len());
        let mut unreadable = Vec::new();
        for model in models {
            let version = model.version.clone();
            match ExecutedMigrationRecord::try_from(model) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Unreadable version row \"{}\": {}", version, e);
                    unreadable.push(version);
                }
            }
        }
        Ok(ExecutedSet::new(records).with_unreadable(unreadable))
    }

    async fn discard_unreadable(&self, version: &str) -> Result<(), MigrationError> {
        let res = MigrationVersionsEntity::delete_by_id(version.to_string())
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(MigrationError::UnknownMigrationVersion(version.to_string()));
        }
        debug!("Removed unreadable row \"{}\" from the version table", version);
        Ok(())
    }
}

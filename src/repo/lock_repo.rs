use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use tracing::{debug, warn};

use crate::{
    entities::{MigrationLockActiveModel, MigrationLockColumn, MigrationLocksEntity},
    errors::MigrationError,
    executor::MigrationLock,
};

const LOCK_ROW_ID: i32 = 1;

/// Lock held as a single row in `migration_locks`, owned by a random token.
pub struct MigrationLockRepository {
    db: DatabaseConnection,
    owner: String,
}

impl MigrationLockRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            owner: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Removes a lock row left behind by a crashed run.
    pub async fn force_release(&self) -> Result<u64, MigrationError> {
        let res = MigrationLocksEntity::delete_by_id(LOCK_ROW_ID)
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

#[async_trait]
impl MigrationLock for MigrationLockRepository {
    async fn acquire(&self) -> Result<(), MigrationError> {
        let active_model = MigrationLockActiveModel {
            id: Set(LOCK_ROW_ID),
            owner: Set(self.owner.clone()),
            acquired_at: Set(chrono::Utc::now().naive_utc()),
        };

        match MigrationLocksEntity::insert(active_model)
            .exec_without_returning(&self.db)
            .await
        {
            Ok(_) => {
                debug!("Acquired migration lock as {}", self.owner);
                Ok(())
            }
            Err(e) => {
                let holder = MigrationLocksEntity::find_by_id(LOCK_ROW_ID)
                    .one(&self.db)
                    .await?;
                match holder {
                    Some(holder) => Err(MigrationError::LockUnavailable(format!(
                        "held by {} since {}",
                        holder.owner, holder.acquired_at
                    ))),
                    None => Err(e.into()),
                }
            }
        }
    }

    async fn release(&self) -> Result<(), MigrationError> {
        let res = MigrationLocksEntity::delete_many()
            .filter(MigrationLockColumn::Id.eq(LOCK_ROW_ID))
            .filter(MigrationLockColumn::Owner.eq(self.owner.as_str()))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            warn!("Migration lock was not held by {}", self.owner);
        }
        Ok(())
    }
}

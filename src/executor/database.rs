use std::time::Instant;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, error};

use crate::{
    errors::MigrationError,
    executor::StatementExecutor,
    repo::version_repo::{delete_record, insert_record},
    types::{Direction, MigrationId},
};

/// Executes migration statements against the configured database.
///
/// The `migration_versions` row is written in the same transaction as the
/// statements, so a failed bookkeeping write rolls the batch back too.
pub struct DatabaseExecutor {
    db: DatabaseConnection,
}

impl DatabaseExecutor {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn rollback(txn: DatabaseTransaction, id: &MigrationId) {
    if let Err(e) = txn.rollback().await {
        error!("Rollback failed for {}: {}", id, e);
    }
}

#[async_trait]
impl StatementExecutor for DatabaseExecutor {
    async fn execute_batch(
        &self,
        id: &MigrationId,
        direction: Direction,
        statements: &[String],
    ) -> Result<(), MigrationError> {
        let failure = |message: String| MigrationError::StatementExecutionFailure {
            id: id.clone(),
            message,
        };

        let started = Instant::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| failure(format!("Failed to start transaction: {}", e)))?;

        for statement in statements {
            debug!("Executing statement for {}: {}", id, statement);
            if let Err(e) = txn.execute_unprepared(statement).await {
                error!("Statement failed for {}: {}", id, e);
                rollback(txn, id).await;
                return Err(failure(format!("{} ({})", e, statement)));
            }
        }

        let recorded = match direction {
            Direction::Up => insert_record(&txn, id, Some(started.elapsed())).await,
            Direction::Down => delete_record(&txn, id).await,
        };
        if let Err(e) = recorded {
            error!("Version table update failed for {}: {}", id, e);
            rollback(txn, id).await;
            return Err(failure(format!("Failed to update the version table: {}", e)));
        }

        txn.commit()
            .await
            .map_err(|e| failure(format!("Failed to commit: {}", e)))
    }
}

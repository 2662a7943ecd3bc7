use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    errors::MigrationError,
    executor::StatementExecutor,
    metadata::MetadataStore,
    types::{Direction, MigrationId},
};

/// Executor double that records every committed batch and fails for chosen ids.
///
/// The record change goes to `store` before the batch is kept, so a failing
/// store leaves no committed batch behind.
pub struct RecordingExecutor {
    store: Arc<dyn MetadataStore>,
    failing: BTreeSet<MigrationId>,
    batches: Mutex<Vec<(MigrationId, Vec<String>)>>,
}

impl RecordingExecutor {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self::failing_on(store, std::iter::empty())
    }

    pub fn failing_on(
        store: Arc<dyn MetadataStore>,
        ids: impl IntoIterator<Item = MigrationId>,
    ) -> Self {
        Self {
            store,
            failing: ids.into_iter().collect(),
            batches: Mutex::default(),
        }
    }

    /// Batches that were committed, in order.
    pub fn batches(&self) -> Vec<(MigrationId, Vec<String>)> {
        self.batches
            .lock()
            .map(|b| b.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl StatementExecutor for RecordingExecutor {
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

        if self.failing.contains(id) {
            return Err(failure("simulated failure".to_string()));
        }

        match direction {
            Direction::Up => self.store.record_applied(id, None).await,
            Direction::Down => self.store.record_reverted(id).await,
        }
        .map_err(|e| failure(format!("Failed to update the version table: {}", e)))?;

        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id.clone(), statements.to_vec()));
        Ok(())
    }
}

use std::{collections::BTreeMap, sync::Mutex, time::Duration};

use async_trait::async_trait;

use crate::{
    errors::MigrationError,
    metadata::{ExecutedMigrationRecord, ExecutedSet, MetadataStore},
    types::{Direction, MigrationId},
};

/// Metadata store kept in memory, for tests and dry tooling.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    records: Mutex<BTreeMap<MigrationId, ExecutedMigrationRecord>>,
    unreadable: Mutex<Vec<String>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executed(ids: impl IntoIterator<Item = MigrationId>) -> Self {
        let store = Self::new();
        {
            let mut records = store.lock();
            for record in ExecutedSet::from_ids(ids).iter() {
                records.insert(record.id.clone(), record.clone());
            }
        }
        store
    }

    /// Adds rows whose version cannot be read as an id.
    pub fn with_unreadable(self, versions: impl IntoIterator<Item = String>) -> Self {
        self.unreadable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend(versions);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<MigrationId, ExecutedMigrationRecord>> {
        // A poisoned map is still consistent: every mutation is a single insert or remove.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn record_applied(
        &self,
        id: &MigrationId,
        execution_time: Option<Duration>,
    ) -> Result<(), MigrationError> {
        let mut records = self.lock();
        if records.contains_key(id) {
            return Err(MigrationError::VersionAlreadyExists(id.clone()));
        }
        records.insert(
            id.clone(),
            ExecutedMigrationRecord {
                id: id.clone(),
                executed_at: chrono::Utc::now().naive_utc(),
                direction: Direction::Up,
                execution_time_ms: execution_time.map(|d| d.as_millis() as i64),
            },
        );
        Ok(())
    }

    async fn record_reverted(&self, id: &MigrationId) -> Result<(), MigrationError> {
        self.lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MigrationError::VersionDoesNotExist(id.clone()))
    }

    async fn list_executed(&self) -> Result<ExecutedSet, MigrationError> {
        let unreadable = self
            .unreadable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        Ok(ExecutedSet::new(self.lock().values().cloned()).with_unreadable(unreadable))
    }

    async fn discard_unreadable(&self, version: &str) -> Result<(), MigrationError> {
        let mut unreadable = self
            .unreadable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = unreadable.len();
        unreadable.retain(|v| v != version);
        if unreadable.len() == before {
            return Err(MigrationError::UnknownMigrationVersion(version.to_string()));
        }
        Ok(())
    }
}

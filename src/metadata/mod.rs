pub mod mark;
pub mod memory;

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDateTime;

pub use mark::{MarkOutcome, discard, mark, mark_all};
pub use memory::InMemoryMetadataStore;

use crate::{
    errors::MigrationError,
    types::{Direction, MigrationId},
};

/// Bookkeeping row for one executed migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedMigrationRecord {
    pub id: MigrationId,
    pub executed_at: NaiveDateTime,
    pub direction: Direction,
    pub execution_time_ms: Option<i64>,
}

/// Executed migrations, ordered by id.
///
/// Version table rows whose version is not a valid id are kept aside as
/// `unreadable`; they take no part in planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutedSet {
    records: BTreeMap<MigrationId, ExecutedMigrationRecord>,
    unreadable: Vec<String>,
}

impl ExecutedSet {
    pub fn new(records: impl IntoIterator<Item = ExecutedMigrationRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            unreadable: Vec::new(),
        }
    }

    pub fn with_unreadable(mut self, versions: impl IntoIterator<Item = String>) -> Self {
        self.unreadable.extend(versions);
        self.unreadable.sort();
        self.unreadable.dedup();
        self
    }

    /// Raw versions of rows that could not be read as migration ids.
    pub fn unreadable(&self) -> &[String] {
        &self.unreadable
    }

    /// Builds a set from bare ids, stamped with the current time.
    pub fn from_ids(ids: impl IntoIterator<Item = MigrationId>) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self::new(ids.into_iter().map(|id| ExecutedMigrationRecord {
            id,
            executed_at: now,
            direction: Direction::Up,
            execution_time_ms: None,
        }))
    }

    pub fn get(&self, id: &MigrationId) -> Option<&ExecutedMigrationRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &MigrationId) -> bool {
        self.records.contains_key(id)
    }

    pub fn ids(&self) -> impl DoubleEndedIterator<Item = &MigrationId> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ExecutedMigrationRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Persistent record of which migrations have run.
///
/// Mutations only ever insert or delete a record; history is never rewritten.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Inserts a record. Fails with `VersionAlreadyExists` if one is present.
    async fn record_applied(
        &self,
        id: &MigrationId,
        execution_time: Option<Duration>,
    ) -> Result<(), MigrationError>;

    /// Deletes a record. Fails with `VersionDoesNotExist` if there is none.
    async fn record_reverted(&self, id: &MigrationId) -> Result<(), MigrationError>;

    async fn list_executed(&self) -> Result<ExecutedSet, MigrationError>;

    /// Deletes a row listed in `ExecutedSet::unreadable` by its raw version.
    async fn discard_unreadable(&self, version: &str) -> Result<(), MigrationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executed_set_is_ordered() {
        let set = ExecutedSet::from_ids([
            MigrationId::from(30),
            MigrationId::from(4),
            MigrationId::from(100),
        ]);
        let ids: Vec<String> = set.ids().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["4", "30", "100"]);
        assert_eq!(set.ids().next_back(), Some(&MigrationId::from(100)));
    }

    #[test]
    fn test_unreadable_rows_are_kept_apart() {
        let set = ExecutedSet::from_ids([MigrationId::from(1)])
            .with_unreadable(["bogus".to_string(), "alpha".to_string(), "bogus".to_string()]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.unreadable(), &["alpha".to_string(), "bogus".to_string()]);
    }
}

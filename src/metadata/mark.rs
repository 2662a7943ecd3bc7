use std::fmt;

use tracing::info;

use crate::{
    errors::MigrationError,
    metadata::MetadataStore,
    registry::AvailableSet,
    types::MigrationId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    Added(MigrationId),
    Deleted(MigrationId),
    Unchanged(MigrationId),
    /// An unreadable row, removed by its raw version.
    Discarded(String),
}

impl fmt::Display for MarkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkOutcome::Added(id) => write!(f, "{} added to the version table.", id),
            MarkOutcome::Deleted(id) => write!(f, "{} deleted from the version table.", id),
            MarkOutcome::Unchanged(id) => write!(f, "{} left unchanged.", id),
            MarkOutcome::Discarded(version) => {
                write!(f, "\"{}\" deleted from the version table.", version)
            }
        }
    }
}

/// Adds or deletes the bookkeeping record of one migration without running it.
///
/// Without `allow_overwrite`, marking an already applied migration as applied
/// (or a missing one as deleted) is an error; with it, a no-op. Ids that no
/// source root provides may only be deleted.
pub async fn mark(
    store: &dyn MetadataStore,
    available: &AvailableSet,
    id: &MigrationId,
    applied: bool,
    allow_overwrite: bool,
) -> Result<MarkOutcome, MigrationError> {
    let executed = store.list_executed().await?;
    let is_executed = executed.contains(id);

    if !available.contains(id) && applied {
        return Err(MigrationError::UnknownMigrationVersion(id.to_string()));
    }

    match (applied, is_executed) {
        (true, true) | (false, false) => {
            if !allow_overwrite {
                return Err(if applied {
                    MigrationError::VersionAlreadyExists(id.clone())
                } else {
                    MigrationError::VersionDoesNotExist(id.clone())
                });
            }
            Ok(MarkOutcome::Unchanged(id.clone()))
        }
        (true, false) => {
            store.record_applied(id, None).await?;
            info!("Marked {} as applied", id);
            Ok(MarkOutcome::Added(id.clone()))
        }
        (false, true) => {
            store.record_reverted(id).await?;
            info!("Marked {} as not applied", id);
            Ok(MarkOutcome::Deleted(id.clone()))
        }
    }
}

/// Deletes a version table row whose version is not a valid id.
pub async fn discard(
    store: &dyn MetadataStore,
    version: &str,
) -> Result<MarkOutcome, MigrationError> {
    store.discard_unreadable(version).await?;
    info!("Discarded unreadable version row \"{}\"", version);
    Ok(MarkOutcome::Discarded(version.to_string()))
}

/// Marks every migration at once.
///
/// With `applied == false` the version table is cleared first, including
/// records of unavailable migrations and unreadable rows. In both cases every
/// available migration ends up recorded as applied.
pub async fn mark_all(
    store: &dyn MetadataStore,
    available: &AvailableSet,
    applied: bool,
) -> Result<Vec<MarkOutcome>, MigrationError> {
    let mut outcomes = Vec::new();

    if !applied {
        let executed = store.list_executed().await?;
        for id in executed.ids() {
            outcomes.push(mark(store, available, id, false, true).await?);
        }
        for version in executed.unreadable() {
            outcomes.push(discard(store, version).await?);
        }
    }

    for definition in available.iter() {
        outcomes.push(mark(store, available, &definition.id, true, true).await?);
    }

    Ok(outcomes)
}

use std::path::PathBuf;

use thiserror::Error;

use crate::types::MigrationId;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(
        "Migration version {id} is defined twice: {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateIdentifier {
        id: MigrationId,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Unknown version: {0}")]
    UnknownMigrationVersion(String),

    #[error("Could not find any migrations to execute for \"{0}\"")]
    NoMigrationsToExecute(String),

    #[error("No migrations found")]
    NoMigrationsFound,

    #[error(
        "Cannot reach version {target}: migration {migration} depends on {dependency}, which lies on the other side of the target"
    )]
    DependencyAcrossTarget {
        target: MigrationId,
        migration: MigrationId,
        dependency: MigrationId,
    },

    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    #[error("The version \"{0}\" already exists in the version table.")]
    VersionAlreadyExists(MigrationId),

    #[error("The version \"{0}\" does not exist in the version table.")]
    VersionDoesNotExist(MigrationId),

    #[error("{0}")]
    InvalidUsage(String),

    #[error("Migration lock is unavailable: {0}")]
    LockUnavailable(String),

    #[error("Migration {id} failed: {message}")]
    StatementExecutionFailure { id: MigrationId, message: String },

    #[error("Invalid migration file {}: {reason}", .path.display())]
    InvalidMigrationFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

impl MigrationError {
    /// Natural end states ("nothing to do"), reported as information rather than failure.
    pub fn is_nothing_to_do(&self) -> bool {
        matches!(
            self,
            MigrationError::NoMigrationsToExecute(_) | MigrationError::NoMigrationsFound
        )
    }

    /// Errors caused by the caller asking for something that cannot exist.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            MigrationError::InvalidUsage(_)
                | MigrationError::UnknownMigrationVersion(_)
                | MigrationError::DependencyAcrossTarget { .. }
        )
    }

    pub fn invalid_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidMigrationFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub mod definition;
pub mod roots;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::debug;

pub use definition::MigrationDefinition;
pub use roots::{PackageRoots, SourceRoot, SourceRoots, StaticRoots};

use crate::{
    errors::MigrationError,
    types::{MigrationId, Platform},
};

/// Name of the directory inside a root that holds per-platform migrations.
pub const MIGRATIONS_DIR: &str = "Migrations";

/// Migrations found across all roots, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableSet {
    migrations: BTreeMap<MigrationId, Arc<MigrationDefinition>>,
}

impl AvailableSet {
    pub fn new(definitions: impl IntoIterator<Item = MigrationDefinition>) -> Self {
        Self {
            migrations: definitions
                .into_iter()
                .map(|d| (d.id.clone(), Arc::new(d)))
                .collect(),
        }
    }

    pub fn get(&self, id: &MigrationId) -> Option<&Arc<MigrationDefinition>> {
        self.migrations.get(id)
    }

    pub fn contains(&self, id: &MigrationId) -> bool {
        self.migrations.contains_key(id)
    }

    pub fn ids(&self) -> impl DoubleEndedIterator<Item = &MigrationId> {
        self.migrations.keys()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Arc<MigrationDefinition>> {
        self.migrations.values()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

/// Scans source roots for `Migrations/<Platform>/Version*.sql` files.
#[derive(Clone)]
pub struct MigrationRegistry {
    roots: Arc<dyn SourceRoots>,
    platform: Platform,
}

impl MigrationRegistry {
    pub fn new(roots: Arc<dyn SourceRoots>, platform: Platform) -> Self {
        Self { roots, platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn roots(&self) -> Vec<SourceRoot> {
        self.roots.roots()
    }

    /// Directory that holds `root`'s migrations for the current platform.
    pub fn migrations_dir(&self, root: &SourceRoot) -> PathBuf {
        root.path
            .join(MIGRATIONS_DIR)
            .join(self.platform.to_string())
    }

    pub fn discover(&self) -> Result<AvailableSet, MigrationError> {
        let mut found: BTreeMap<MigrationId, Arc<MigrationDefinition>> = BTreeMap::new();

        for root in self.roots.roots() {
            let dir = self.migrations_dir(&root);
            if !dir.is_dir() {
                debug!("No migrations for root '{}' in {}", root.name, dir.display());
                continue;
            }

            for path in migration_files(&dir)? {
                let definition = MigrationDefinition::load(&root.name, &path)?;
                if let Some(existing) = found.get(&definition.id) {
                    return Err(MigrationError::DuplicateIdentifier {
                        id: definition.id.clone(),
                        first: existing.path.clone(),
                        second: definition.path.clone(),
                    });
                }
                debug!(
                    "Discovered migration {} in root '{}'",
                    definition.id, root.name
                );
                found.insert(definition.id.clone(), Arc::new(definition));
            }
        }

        Ok(AvailableSet { migrations: found })
    }
}

fn migration_files(dir: &Path) -> Result<Vec<PathBuf>, MigrationError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_candidate = path.is_file()
            && path.extension().is_some_and(|ext| ext == "sql")
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(MigrationId::FILE_PREFIX));
        if is_candidate {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

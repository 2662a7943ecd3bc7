use std::path::{Path, PathBuf};

use anyhow::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use strata::{
    config::{LogConfig, Settings},
    executor::CancelSignal,
    services::AppServices,
    types::Platform,
};
use tempfile::TempDir;

use crate::common::load_test_env;

/// A packages directory and a sqlite database in a temporary directory.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub settings: Settings,
}

impl TestWorkspace {
    pub fn new() -> Self {
        load_test_env();
        let dir = TempDir::new().expect("failed to create temp dir");

        let mut settings = Settings::default();
        settings.database.url = format!("sqlite://{}?mode=rwc", dir.path().join("strata.db").display());
        settings.logs = LogConfig {
            file_enabled: false,
            ..Default::default()
        };
        settings.migrations.packages_dir = Some(dir.path().join("packages"));
        settings.migrations.staging_dir = dir.path().join("staging");
        settings.migrations.platform = Some(Platform::Sqlite);

        std::fs::create_dir_all(dir.path().join("packages")).expect("failed to create packages dir");
        Self { dir, settings }
    }

    pub fn root_path(&self, root: &str) -> PathBuf {
        self.dir.path().join("packages").join(root)
    }

    pub fn add_root(&self, root: &str) -> PathBuf {
        let path = self.root_path(root);
        std::fs::create_dir_all(&path).expect("failed to create root");
        path
    }

    pub fn migration_path(&self, root: &str, id: u64) -> PathBuf {
        self.root_path(root)
            .join("Migrations")
            .join("Sqlite")
            .join(format!("Version{}.sql", id))
    }

    /// Writes a migration file with the given header and sections.
    pub fn write_migration(&self, root: &str, id: u64, depends: &[u64], up: &str, down: &str) -> PathBuf {
        let path = self.migration_path(root, id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let depends = depends
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        std::fs::write(
            &path,
            format!(
                "-- description: migration {id}\n-- depends: {depends}\n-- +migrate up\n{up}\n-- +migrate down\n{down}\n"
            ),
        )
        .unwrap();
        path
    }

    /// A migration that creates table `t<id>` and drops it on the way down.
    pub fn write_table_migration(&self, root: &str, id: u64, depends: &[u64]) -> PathBuf {
        self.write_migration(
            root,
            id,
            depends,
            &format!("CREATE TABLE t{id} (id INTEGER PRIMARY KEY);"),
            &format!("DROP TABLE t{id};"),
        )
    }

    pub async fn services(&self) -> Result<AppServices> {
        AppServices::new(&self.settings, CancelSignal::new()).await
    }

    pub async fn connect(&self) -> Result<DatabaseConnection> {
        Ok(Database::connect(&self.settings.database.url).await?)
    }

    pub async fn table_exists(&self, table: &str) -> bool {
        let db = self.connect().await.expect("failed to connect");
        db.execute_unprepared(&format!("SELECT 1 FROM {}", table))
            .await
            .is_ok()
    }

    pub fn staging_dir(&self) -> &Path {
        &self.settings.migrations.staging_dir
    }
}

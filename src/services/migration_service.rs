use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    errors::MigrationError,
    executor::{
        ApplyOptions, CancelSignal, ExecutionCoordinator, ExecutionReport, MigrationLock,
        StatementExecutor,
    },
    metadata::{ExecutedSet, MarkOutcome, MetadataStore, discard, mark, mark_all},
    planner::{Alias, Plan, current_version, plan_for, plan_to, resolve},
    registry::{AvailableSet, MigrationRegistry, SourceRoot},
    types::{Direction, MigrationId, Platform},
    utils::{ProgressReporter, SqlWriter, move_file, render_migration},
};

/// Name of the table that records executed migrations.
pub const VERSION_TABLE: &str = "migration_versions";

#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    pub dry_run: bool,
    /// Suppresses the "nothing to do" messages.
    pub quiet: bool,
    /// Implies a dry run; the plan's SQL is written here instead.
    pub write_sql: Option<PathBuf>,
}

impl MigrateOptions {
    fn is_dry_run(&self) -> bool {
        self.dry_run || self.write_sql.is_some()
    }
}

#[derive(Debug)]
pub enum MigrateOutcome {
    /// The target is already reached. `None` when running quietly.
    NothingToDo(Option<String>),
    Applied {
        header: String,
        report: ExecutionReport,
        sql_file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub id: MigrationId,
    pub root: Option<String>,
    pub description: Option<String>,
    pub migrated: bool,
    pub available: bool,
    pub executed_at: Option<NaiveDateTime>,
    pub execution_time_ms: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub storage_table: &'static str,
    pub database: String,
    pub platform: Platform,
    pub roots: Vec<SourceRoot>,
    pub previous: Option<MigrationId>,
    pub current: MigrationId,
    pub next: Option<MigrationId>,
    pub latest: Option<MigrationId>,
    pub executed: usize,
    pub executed_unavailable: usize,
    pub available: usize,
    pub new: usize,
    /// Version table rows that are not valid ids. Counted as executed unavailable.
    pub unreadable: Vec<String>,
    /// Every known id, only filled in when requested.
    pub migrations: Vec<StatusRow>,
}

/// Entry point for everything the CLI can do with migrations.
pub struct MigrationService {
    registry: MigrationRegistry,
    store: Arc<dyn MetadataStore>,
    coordinator: ExecutionCoordinator,
    staging_dir: PathBuf,
    database: String,
}

impl MigrationService {
    pub fn new(
        registry: MigrationRegistry,
        store: Arc<dyn MetadataStore>,
        executor: Arc<dyn StatementExecutor>,
        lock: Arc<dyn MigrationLock>,
        cancel: CancelSignal,
        staging_dir: PathBuf,
        database: String,
    ) -> Self {
        let coordinator = ExecutionCoordinator::new(executor, lock, cancel);
        Self {
            registry,
            store,
            coordinator,
            staging_dir,
            database,
        }
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    async fn load(&self) -> Result<(AvailableSet, ExecutedSet)> {
        let available = self
            .registry
            .discover()
            .context("Failed to discover migrations")?;
        let executed = self
            .store
            .list_executed()
            .await
            .context("Failed to read the version table")?;
        Ok((available, executed))
    }

    pub async fn status(&self, show_migrations: bool) -> Result<StatusReport> {
        let (available, executed) = self.load().await?;
        let unavailable = executed_unavailable(&available, &executed);
        let lookup = |alias: Alias| resolve(&alias.to_string(), &available, &executed).ok();

        let current = current_version(&executed);
        let previous = lookup(Alias::Prev).or_else(|| (!current.is_zero()).then(MigrationId::zero));

        let migrations = if show_migrations {
            available
                .ids()
                .chain(executed.ids())
                .cloned()
                .sorted()
                .dedup()
                .map(|id| {
                    let definition = available.get(&id);
                    let record = executed.get(&id);
                    StatusRow {
                        root: definition.map(|d| d.root.clone()),
                        description: definition.and_then(|d| d.description.clone()),
                        migrated: record.is_some(),
                        available: definition.is_some(),
                        executed_at: record.map(|r| r.executed_at),
                        execution_time_ms: record.and_then(|r| r.execution_time_ms),
                        id,
                    }
                })
                .collect()
        } else {
            vec![]
        };

        Ok(StatusReport {
            storage_table: VERSION_TABLE,
            database: self.database.clone(),
            platform: self.registry.platform(),
            roots: self.registry.roots(),
            previous,
            next: lookup(Alias::Next),
            latest: lookup(Alias::Latest),
            current,
            executed: executed.len(),
            executed_unavailable: unavailable.len() + executed.unreadable().len(),
            available: available.len(),
            new: available.ids().filter(|id| !executed.contains(id)).count(),
            unreadable: executed.unreadable().to_vec(),
            migrations,
        })
    }

    /// Moves the executed state to `version` (an id or an alias).
    pub async fn migrate(
        &self,
        version: &str,
        options: MigrateOptions,
        progress: &ProgressReporter,
    ) -> Result<MigrateOutcome> {
        let (available, executed) = self.load().await?;
        let quiet = |message: String| MigrateOutcome::NothingToDo((!options.quiet).then_some(message));

        if available.is_empty() {
            warn!("No registered migrations");
            return Ok(quiet(format!(
                "The version \"{}\" can't be reached, there are no registered migrations.",
                version
            )));
        }

        for id in executed_unavailable(&available, &executed) {
            warn!("Executed migration {} is not available in any source root", id);
        }

        let current = current_version(&executed);
        let target = match resolve(version, &available, &executed) {
            Ok(target) => target,
            Err(e) if e.is_nothing_to_do() => {
                info!("Nothing to migrate for \"{}\": {}", version, e);
                return Ok(quiet(nothing_to_do_message(version, &current)));
            }
            Err(e) => return Err(e.into()),
        };

        let plan = plan_to(&target, &available, &executed)?;
        if plan.is_empty() {
            return Ok(quiet(nothing_to_do_message(version, &current)));
        }

        self.apply(plan, &target, &options, progress).await
    }

    /// Runs exactly one migration in one direction.
    pub async fn migrate_one(
        &self,
        version: &str,
        direction: Direction,
        options: MigrateOptions,
        progress: &ProgressReporter,
    ) -> Result<MigrateOutcome> {
        let (available, executed) = self.load().await?;

        let id = MigrationId::parse(version)
            .ok()
            .filter(|id| available.contains(id))
            .ok_or_else(|| {
                MigrationError::InvalidUsage(format!("Version {} is not available", version))
            })?;

        let plan = plan_for(std::slice::from_ref(&id), direction, &available, &executed)?;
        self.apply(plan, &id, &options, progress).await
    }

    async fn apply(
        &self,
        plan: Plan,
        target: &MigrationId,
        options: &MigrateOptions,
        progress: &ProgressReporter,
    ) -> Result<MigrateOutcome> {
        let dry_run = options.is_dry_run();
        let header = format!(
            "Migrating{} {} to {}",
            if dry_run { " (dry-run)" } else { "" },
            plan.direction(),
            target
        );
        info!("{} ({} migrations)", header, plan.len());

        let report = self
            .coordinator
            .apply(&plan, ApplyOptions { dry_run }, progress)
            .await?;

        let sql_file = match &options.write_sql {
            Some(path) => Some(write_sql(path, &plan, target)?),
            None => None,
        };

        Ok(MigrateOutcome::Applied {
            header,
            report,
            sql_file,
        })
    }

    /// Adds (`add`) or deletes (`delete`) version table records without
    /// running anything. `version` may be `all`, or the raw version of an
    /// unreadable row when deleting.
    pub async fn mark(&self, version: &str, add: bool, delete: bool) -> Result<Vec<MarkOutcome>> {
        if add == delete {
            return Err(MigrationError::InvalidUsage(
                "You must specify whether you want to --add or --delete the specified version."
                    .to_string(),
            )
            .into());
        }

        let available = self
            .registry
            .discover()
            .context("Failed to discover migrations")?;

        if version.trim().eq_ignore_ascii_case("all") {
            return Ok(mark_all(self.store.as_ref(), &available, add).await?);
        }

        let id = match MigrationId::parse(version) {
            Ok(id) => id,
            Err(e) => {
                let executed = self
                    .store
                    .list_executed()
                    .await
                    .context("Failed to read the version table")?;
                let raw = version.trim();
                if delete && executed.unreadable().iter().any(|v| v == raw) {
                    return Ok(vec![discard(self.store.as_ref(), raw).await?]);
                }
                return Err(e.into());
            }
        };
        Ok(vec![
            mark(self.store.as_ref(), &available, &id, add, false).await?,
        ])
    }

    /// Creates an empty migration file in `root` and returns its path.
    pub async fn generate(&self, root: &str) -> Result<PathBuf> {
        let roots = self.registry.roots();
        let root = roots.iter().find(|r| r.name == root).ok_or_else(|| {
            MigrationError::InvalidUsage(format!(
                "Unknown root \"{}\". Available roots: {}",
                root,
                roots.iter().map(|r| r.name.as_str()).join(", ")
            ))
        })?;

        let created_at = Utc::now();
        let version = MigrationId::parse(&created_at.format("%Y%m%d%H%M%S").to_string())?;
        let contents = render_migration(&version, &root.name, self.registry.platform(), created_at)?;

        std::fs::create_dir_all(&self.staging_dir).with_context(|| {
            format!(
                "Failed to create staging directory {}",
                self.staging_dir.display()
            )
        })?;
        let staged = self.staging_dir.join(version.file_name());
        std::fs::write(&staged, contents)
            .with_context(|| format!("Failed to write {}", staged.display()))?;

        let destination = self.registry.migrations_dir(root).join(version.file_name());
        move_file(&staged, &destination)
            .with_context(|| format!("Failed to move migration to {}", destination.display()))?;

        info!("Generated migration {} in {}", version, destination.display());
        Ok(destination)
    }
}

fn executed_unavailable(available: &AvailableSet, executed: &ExecutedSet) -> Vec<MigrationId> {
    executed
        .ids()
        .filter(|id| !available.contains(id))
        .cloned()
        .collect()
}

fn nothing_to_do_message(alias: &str, current: &MigrationId) -> String {
    let alias = alias.trim();
    match alias.parse::<Alias>() {
        Ok(Alias::First | Alias::Latest | Alias::Current) => {
            format!("Already at the {} version (\"{}\")", alias, current)
        }
        Ok(Alias::Next | Alias::Prev) => format!(
            "The version \"{}\" couldn't be reached, you are at version \"{}\"",
            alias, current
        ),
        Err(_) if alias.starts_with("current") => format!(
            "The version \"{}\" couldn't be reached, you are at version \"{}\"",
            alias, current
        ),
        Err(_) => format!("You are already at version \"{}\"", current),
    }
}

fn write_sql(path: &Path, plan: &Plan, target: &MigrationId) -> Result<PathBuf> {
    let mut writer = SqlWriter::to_path(path)
        .with_context(|| format!("Failed to create SQL file {}", path.display()))?;
    writer.write_header(plan.direction(), target)?;
    for item in plan.items() {
        writer.write_migration(item.id(), item.statements())?;
    }
    Ok(writer.file_path().to_path_buf())
}

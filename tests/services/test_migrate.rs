use anyhow::Result;
use strata::{
    errors::MigrationError,
    executor::{DatabaseExecutor, MigrationLock, Outcome, StatementExecutor},
    repo::MigrationLockRepository,
    services::{MigrateOptions, MigrateOutcome},
    types::{Direction, MigrationId},
    utils::ProgressReporter,
};

use crate::common::TestWorkspace;

fn applied(outcome: MigrateOutcome) -> (String, strata::executor::ExecutionReport) {
    match outcome {
        MigrateOutcome::Applied { header, report, .. } => (header, report),
        MigrateOutcome::NothingToDo(message) => panic!("expected a run, got {:?}", message),
    }
}

fn nothing_to_do(outcome: MigrateOutcome) -> Option<String> {
    match outcome {
        MigrateOutcome::NothingToDo(message) => message,
        MigrateOutcome::Applied { header, .. } => panic!("expected nothing to do, got {}", header),
    }
}

#[tokio::test]
async fn test_migrate_to_latest_creates_tables() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    ws.write_table_migration("core", 2, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    let outcome = service
        .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
        .await?;
    let (header, report) = applied(outcome);

    assert_eq!(header, "Migrating up to 2");
    assert!(report.is_success());
    assert_eq!(report.succeeded().count(), 2);
    assert!(ws.table_exists("t1").await);
    assert!(ws.table_exists("t2").await);

    let status = service.status(false).await?;
    assert_eq!(status.current, MigrationId::from(2));
    assert_eq!(status.executed, 2);
    assert_eq!(status.new, 0);
    Ok(())
}

#[tokio::test]
async fn test_migrate_twice_is_nothing_to_do() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    service
        .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
        .await?;
    let outcome = service
        .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
        .await?;

    assert_eq!(
        nothing_to_do(outcome).as_deref(),
        Some("Already at the latest version (\"1\")")
    );

    let quiet = service
        .migrate(
            "next",
            MigrateOptions {
                quiet: true,
                ..Default::default()
            },
            &ProgressReporter::silent(),
        )
        .await?;
    assert_eq!(nothing_to_do(quiet), None);
    Ok(())
}

#[tokio::test]
async fn test_migrate_without_migrations() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.add_root("core");
    let services = ws.services().await?;

    let outcome = services
        .migration_service
        .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
        .await?;

    assert_eq!(
        nothing_to_do(outcome).as_deref(),
        Some("The version \"latest\" can't be reached, there are no registered migrations.")
    );
    Ok(())
}

#[tokio::test]
async fn test_migrate_down_to_zero_reverts_everything() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    ws.write_table_migration("core", 2, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    service
        .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
        .await?;
    let (header, report) = applied(
        service
            .migrate("0", MigrateOptions::default(), &ProgressReporter::silent())
            .await?,
    );

    assert_eq!(header, "Migrating down to 0");
    assert_eq!(
        report.items.iter().map(|i| i.id.clone()).collect::<Vec<_>>(),
        vec![MigrationId::from(2), MigrationId::from(1)]
    );
    assert!(!ws.table_exists("t1").await);
    assert_eq!(service.status(false).await?.current, MigrationId::zero());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_changes_nothing() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    let (header, report) = applied(
        service
            .migrate(
                "latest",
                MigrateOptions {
                    dry_run: true,
                    ..Default::default()
                },
                &ProgressReporter::silent(),
            )
            .await?,
    );

    assert_eq!(header, "Migrating (dry-run) up to 1");
    assert_eq!(report.items[0].outcome, Outcome::DryRun);
    assert!(!ws.table_exists("t1").await);
    assert_eq!(service.status(false).await?.executed, 0);
    Ok(())
}

#[tokio::test]
async fn test_write_sql_writes_plan_without_executing() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;
    let target = ws.dir.path().join("out").join("plan.sql");

    let outcome = services
        .migration_service
        .migrate(
            "latest",
            MigrateOptions {
                write_sql: Some(target.clone()),
                ..Default::default()
            },
            &ProgressReporter::silent(),
        )
        .await?;

    match outcome {
        MigrateOutcome::Applied {
            header, sql_file, ..
        } => {
            assert!(header.contains("(dry-run)"));
            assert_eq!(sql_file.as_deref(), Some(target.as_path()));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    let sql = std::fs::read_to_string(&target)?;
    assert!(sql.contains("-- Version 1"));
    assert!(sql.contains("CREATE TABLE t1 (id INTEGER PRIMARY KEY);"));
    assert!(!ws.table_exists("t1").await);
    Ok(())
}

#[tokio::test]
async fn test_failing_migration_halts_and_keeps_earlier_records() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    ws.write_migration("core", 2, &[], "CREATE TABLE broken (;", "SELECT 1;");
    ws.write_table_migration("core", 3, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    let (_, report) = applied(
        service
            .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
            .await?,
    );

    assert!(!report.is_success());
    assert_eq!(report.items[0].outcome, Outcome::Succeeded);
    assert!(matches!(report.items[1].outcome, Outcome::Failed(_)));
    assert_eq!(report.items[2].outcome, Outcome::NotAttempted);
    assert!(matches!(
        report.error,
        Some(MigrationError::StatementExecutionFailure { .. })
    ));
    assert!(ws.table_exists("t1").await);
    assert!(!ws.table_exists("t3").await);
    assert_eq!(service.status(false).await?.current, MigrationId::from(1));
    Ok(())
}

#[tokio::test]
async fn test_dependencies_across_roots_run_first() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_migration(
        "app",
        2,
        &[3],
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER REFERENCES customers(id));",
        "DROP TABLE orders;",
    );
    ws.write_migration(
        "crm",
        3,
        &[],
        "CREATE TABLE customers (id INTEGER PRIMARY KEY);",
        "DROP TABLE customers;",
    );
    let services = ws.services().await?;

    let (_, report) = applied(
        services
            .migration_service
            .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
            .await?,
    );

    assert!(report.is_success());
    assert_eq!(
        report.items.iter().map(|i| i.id.clone()).collect::<Vec<_>>(),
        vec![MigrationId::from(3), MigrationId::from(2)]
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_version_row_rolls_back_statements() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;
    services.migration_service.mark("1", true, false).await?;
    let executor = DatabaseExecutor::new(ws.connect().await?);

    let err = executor
        .execute_batch(
            &MigrationId::from(1),
            Direction::Up,
            &["CREATE TABLE t1 (id INTEGER PRIMARY KEY);".to_string()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::StatementExecutionFailure { .. }));
    assert!(!ws.table_exists("t1").await);

    let err = executor
        .execute_batch(
            &MigrationId::from(5),
            Direction::Down,
            &["CREATE TABLE t5 (id INTEGER PRIMARY KEY);".to_string()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::StatementExecutionFailure { .. }));
    assert!(!ws.table_exists("t5").await);

    executor
        .execute_batch(
            &MigrationId::from(2),
            Direction::Up,
            &["CREATE TABLE t2 (id INTEGER PRIMARY KEY);".to_string()],
        )
        .await?;
    assert!(ws.table_exists("t2").await);
    let status = services.migration_service.status(true).await?;
    assert!(status.migrations.iter().any(|row| row.id == MigrationId::from(2) && row.migrated));
    Ok(())
}

#[tokio::test]
async fn test_dependency_beyond_target_is_refused() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 10, &[]);
    ws.write_table_migration("core", 20, &[40]);
    ws.write_table_migration("core", 30, &[]);
    ws.write_table_migration("core", 40, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    let err = service
        .migrate("20", MigrateOptions::default(), &ProgressReporter::silent())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MigrationError>(),
        Some(MigrationError::DependencyAcrossTarget { .. })
    ));
    assert_eq!(service.status(false).await?.executed, 0);

    let (_, report) = applied(
        service
            .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
            .await?,
    );
    assert!(report.is_success());
    let status = service.status(false).await?;
    assert_eq!((status.executed, status.new), (4, 0));
    assert!(ws.table_exists("t30").await);
    Ok(())
}

#[tokio::test]
async fn test_unknown_version_is_misuse() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;

    let err = services
        .migration_service
        .migrate("42", MigrateOptions::default(), &ProgressReporter::silent())
        .await
        .unwrap_err();

    let err = err.downcast_ref::<MigrationError>().unwrap();
    assert!(err.is_misuse());
    assert_eq!(err.to_string(), "Unknown version: 42");
    Ok(())
}

#[tokio::test]
async fn test_migrate_one_up_and_down() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    ws.write_table_migration("core", 2, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    let (header, _) = applied(
        service
            .migrate_one("2", Direction::Up, MigrateOptions::default(), &ProgressReporter::silent())
            .await?,
    );
    assert_eq!(header, "Migrating up to 2");
    assert!(ws.table_exists("t2").await);
    assert!(!ws.table_exists("t1").await);

    let err = service
        .migrate_one("2", Direction::Up, MigrateOptions::default(), &ProgressReporter::silent())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MigrationError>(),
        Some(MigrationError::VersionAlreadyExists(_))
    ));

    applied(
        service
            .migrate_one("Version2", Direction::Down, MigrateOptions::default(), &ProgressReporter::silent())
            .await?,
    );
    assert!(!ws.table_exists("t2").await);
    Ok(())
}

#[tokio::test]
async fn test_migrate_one_unavailable_version() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;

    let err = services
        .migration_service
        .migrate_one("99", Direction::Up, MigrateOptions::default(), &ProgressReporter::silent())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Version 99 is not available");
    Ok(())
}

#[tokio::test]
async fn test_held_lock_blocks_migrate() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;

    let other = MigrationLockRepository::new(ws.connect().await?);
    other.acquire().await?;

    let err = services
        .migration_service
        .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MigrationError>(),
        Some(MigrationError::LockUnavailable(_))
    ));
    assert!(!ws.table_exists("t1").await);

    other.release().await?;
    let (_, report) = applied(
        services
            .migration_service
            .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
            .await?,
    );
    assert!(report.is_success());
    Ok(())
}

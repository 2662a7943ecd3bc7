use anyhow::Result;
use sea_orm::ConnectionTrait;
use strata::{
    metadata::MarkOutcome,
    services::{MigrateOptions, migration_service::VERSION_TABLE},
    types::{MigrationId, Platform},
    utils::ProgressReporter,
};

use crate::common::TestWorkspace;

#[tokio::test]
async fn test_status_of_fresh_database() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    ws.write_table_migration("billing", 2, &[]);
    let services = ws.services().await?;

    let status = services.migration_service.status(true).await?;

    assert_eq!(status.storage_table, VERSION_TABLE);
    assert_eq!(status.platform, Platform::Sqlite);
    assert_eq!(
        status.roots.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        vec!["billing", "core"]
    );
    assert_eq!(status.current, MigrationId::zero());
    assert_eq!(status.previous, None);
    assert_eq!(status.next, Some(MigrationId::from(1)));
    assert_eq!(status.latest, Some(MigrationId::from(2)));
    assert_eq!((status.available, status.new, status.executed), (2, 2, 0));
    assert_eq!(status.migrations.len(), 2);
    assert!(status.migrations.iter().all(|row| !row.migrated));
    assert_eq!(status.migrations[1].root.as_deref(), Some("billing"));
    Ok(())
}

#[tokio::test]
async fn test_status_reports_executed_unavailable() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let removed = ws.write_table_migration("core", 2, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    service
        .migrate("latest", MigrateOptions::default(), &ProgressReporter::silent())
        .await?;
    std::fs::remove_file(removed)?;

    let status = service.status(true).await?;
    assert_eq!(status.current, MigrationId::from(2));
    assert_eq!(status.previous, Some(MigrationId::from(1)));
    assert_eq!(status.latest, Some(MigrationId::from(2)));
    assert_eq!(status.executed_unavailable, 1);
    let row = status
        .migrations
        .iter()
        .find(|row| row.id == MigrationId::from(2))
        .unwrap();
    assert!(row.migrated);
    assert!(!row.available);
    assert!(row.executed_at.is_some());
    assert!(row.execution_time_ms.is_some());
    Ok(())
}

#[tokio::test]
async fn test_status_lists_unreadable_version_rows() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    ws.connect()
        .await?
        .execute_unprepared(&format!(
            "INSERT INTO {} (version, direction) VALUES ('release-1.0', 'UP')",
            VERSION_TABLE
        ))
        .await?;

    let status = service.status(false).await?;
    assert_eq!(status.unreadable, vec!["release-1.0".to_string()]);
    assert_eq!(status.executed_unavailable, 1);
    assert_eq!(status.executed, 0);

    let outcomes = service.mark("release-1.0", false, true).await?;
    assert_eq!(outcomes, vec![MarkOutcome::Discarded("release-1.0".to_string())]);

    let status = service.status(false).await?;
    assert!(status.unreadable.is_empty());
    assert_eq!(status.executed_unavailable, 0);
    Ok(())
}

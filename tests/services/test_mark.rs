use anyhow::Result;
use strata::{errors::MigrationError, metadata::MarkOutcome, types::MigrationId};

use crate::common::TestWorkspace;

#[tokio::test]
async fn test_mark_add_and_delete() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;
    let service = &services.migration_service;

    let outcomes = service.mark("1", true, false).await?;
    assert_eq!(outcomes, vec![MarkOutcome::Added(MigrationId::from(1))]);
    assert_eq!(
        outcomes[0].to_string(),
        "1 added to the version table."
    );
    assert_eq!(service.status(false).await?.current, MigrationId::from(1));
    assert!(!ws.table_exists("t1").await);

    let err = service.mark("1", true, false).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MigrationError>(),
        Some(MigrationError::VersionAlreadyExists(_))
    ));

    let outcomes = service.mark("1", false, true).await?;
    assert_eq!(outcomes, vec![MarkOutcome::Deleted(MigrationId::from(1))]);
    assert_eq!(service.status(false).await?.executed, 0);
    Ok(())
}

#[tokio::test]
async fn test_mark_requires_exactly_one_mode() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;

    for (add, delete) in [(true, true), (false, false)] {
        let err = services
            .migration_service
            .mark("1", add, delete)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MigrationError>(),
            Some(MigrationError::InvalidUsage(_))
        ));
    }
    Ok(())
}

#[tokio::test]
async fn test_mark_all() -> Result<()> {
    let ws = TestWorkspace::new();
    for id in [1, 2, 3] {
        ws.write_table_migration("core", id, &[]);
    }
    let services = ws.services().await?;
    let service = &services.migration_service;

    service.mark("all", true, false).await?;
    assert_eq!(service.status(false).await?.executed, 3);

    service.mark("2", false, true).await?;
    service.mark("all", false, true).await?;
    let status = service.status(false).await?;
    assert_eq!(status.executed, 3);
    assert_eq!(status.new, 0);
    Ok(())
}

#[tokio::test]
async fn test_mark_unknown_version() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.write_table_migration("core", 1, &[]);
    let services = ws.services().await?;

    let err = services
        .migration_service
        .mark("7", true, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MigrationError>(),
        Some(MigrationError::UnknownMigrationVersion(_))
    ));
    Ok(())
}

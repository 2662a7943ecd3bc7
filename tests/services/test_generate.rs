use anyhow::Result;
use strata::types::MigrationId;

use crate::common::TestWorkspace;

#[tokio::test]
async fn test_generate_writes_into_root() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.add_root("core");
    let services = ws.services().await?;
    let service = &services.migration_service;

    let path = service.generate("core").await?;

    assert!(path.starts_with(ws.root_path("core").join("Migrations").join("Sqlite")));
    assert!(path.exists());
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Version") && name.ends_with(".sql"));

    let status = service.status(true).await?;
    assert_eq!(status.available, 1);
    assert_eq!(status.migrations[0].id, MigrationId::parse(&name.replace(".sql", ""))?);
    assert!(std::fs::read_dir(ws.staging_dir())?.next().is_none());
    Ok(())
}

#[tokio::test]
async fn test_generate_unknown_root() -> Result<()> {
    let ws = TestWorkspace::new();
    ws.add_root("core");
    ws.add_root("billing");
    let services = ws.services().await?;

    let err = services.migration_service.generate("crm").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown root \"crm\". Available roots: billing, core"
    );
    Ok(())
}

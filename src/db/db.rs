use anyhow::{Context, Result};
use sea_orm::{Database, DatabaseConnection};
use tracing::debug;

use crate::config::Settings;

/// Connects to the configured database and brings the bookkeeping tables up to date.
pub async fn init_db(settings: &Settings) -> Result<DatabaseConnection> {
    debug!("Connecting to {}", settings.database.redacted_url());
    let db = Database::connect(&settings.database.url)
        .await
        .with_context(|| format!("Failed to connect to {}", settings.database.redacted_url()))?;
    super::migrations::up(&db).await?;
    Ok(db)
}

use anyhow::{Context as _, Result};
use rust_embed::RustEmbed;
use tera::{Context, Tera};

use crate::types::{MigrationId, Platform};

pub const MIGRATION_TEMPLATE: &str = "migration.sql.jinja";

#[derive(RustEmbed)]
#[folder = "src/assets/templates/"]
struct Templates;

pub fn render_template(template_name: &str, context: &Context) -> Result<String> {
    let file = Templates::get(template_name)
        .ok_or_else(|| anyhow::anyhow!("Failed to find template: {}", template_name))?;

    let template_str =
        std::str::from_utf8(file.data.as_ref()).context("Failed to parse template as UTF-8")?;

    Tera::default()
        .render_str(template_str, context)
        .with_context(|| format!("Failed to render template {}", template_name))
}

/// Renders the skeleton of a new migration file.
pub fn render_migration(
    version: &MigrationId,
    root: &str,
    platform: Platform,
    created_at: chrono::DateTime<chrono::Utc>,
) -> Result<String> {
    let mut context = Context::new();
    context.insert("version", version.as_str());
    context.insert("root", root);
    context.insert("platform", &platform.to_string());
    context.insert("created_at", &created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    render_template(MIGRATION_TEMPLATE, &context)
}

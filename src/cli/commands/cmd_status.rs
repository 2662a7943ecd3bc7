use clap::Args;
use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{
        Alignment, Modify, Style, Width,
        object::{Columns, Rows},
    },
};
use terminal_size::{Width as TermWidth, terminal_size};

use crate::{
    cli::{Context, commands::exit_with},
    services::{StatusReport, StatusRow},
    types::MigrationId,
};

#[derive(Args, Debug)]
pub struct StatusCommand {
    /// List every known migration
    #[arg(long)]
    pub show_migrations: bool,
}

#[derive(Tabled)]
struct KeyValueRow {
    #[tabled(rename = "Attribute")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct MigrationRow {
    #[tabled(rename = "#")]
    index: String,

    #[tabled(rename = "Version")]
    version: String,

    #[tabled(rename = "Root")]
    root: String,

    #[tabled(rename = "Migrated")]
    migrated: String,

    #[tabled(rename = "Executed At")]
    executed_at: String,

    #[tabled(rename = "Duration")]
    duration: String,

    #[tabled(rename = "Description")]
    description: String,
}

pub async fn execute(action: &StatusCommand, ctx: &Context<'_>) {
    let report = ctx
        .services
        .migration_service
        .status(action.show_migrations)
        .await
        .unwrap_or_else(|e| exit_with(e));

    print_overview(&report);
    if action.show_migrations {
        print_migrations(&report.migrations);
    }
}

fn version_or(id: &Option<MigrationId>, fallback: &str) -> String {
    id.as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn print_overview(report: &StatusReport) {
    let roots = if report.roots.is_empty() {
        "none".to_string()
    } else {
        report
            .roots
            .iter()
            .map(|r| format!("{} ({})", r.name, r.path.display()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let unavailable = if report.executed_unavailable > 0 {
        report.executed_unavailable.to_string().red().to_string()
    } else {
        "0".to_string()
    };
    let new = if report.new > 0 {
        report.new.to_string().yellow().to_string()
    } else {
        "0".to_string()
    };

    let rows = vec![
        ("Storage table", report.storage_table.to_string()),
        ("Database", report.database.clone()),
        ("Platform", report.platform.to_string()),
        ("Source roots", roots),
        ("Previous version", version_or(&report.previous, "Already at first version")),
        ("Current version", report.current.to_string().bold().to_string()),
        ("Next version", version_or(&report.next, "Already at latest version")),
        ("Latest version", version_or(&report.latest, "none")),
        ("Executed migrations", report.executed.to_string()),
        ("Executed unavailable migrations", unavailable),
        ("Available migrations", report.available.to_string()),
        ("New migrations", new),
    ];

    let table = Table::new(rows.into_iter().map(|(key, value)| KeyValueRow {
        key: key.to_string(),
        value,
    }))
    .with(Style::rounded())
    .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
    .to_string();
    println!("{}", table);

    if report.executed_unavailable > 0 {
        println!(
            "{}",
            "⚠️ Some executed migrations are not available in any source root".yellow()
        );
    }
    for version in &report.unreadable {
        println!(
            "{}",
            format!(
                "⚠️ Version table row \"{}\" is not a migration version, remove it with `strata mark {} --delete`",
                version, version
            )
            .yellow()
        );
    }
}

fn print_migrations(migrations: &[StatusRow]) {
    if migrations.is_empty() {
        println!("No migrations found");
        return;
    }

    let table_data = migrations
        .iter()
        .enumerate()
        .map(|(i, row)| MigrationRow {
            index: (i + 1).to_string(),
            version: if row.available {
                row.id.to_string()
            } else {
                format!("{} (unavailable)", row.id).red().to_string()
            },
            root: row.root.clone().unwrap_or_default(),
            migrated: if row.migrated {
                "migrated".green().to_string()
            } else {
                "not migrated".yellow().to_string()
            },
            executed_at: row
                .executed_at
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            duration: row
                .execution_time_ms
                .map(|ms| format!("{:.3}s", ms as f64 / 1000.0))
                .unwrap_or_default(),
            description: row.description.clone().unwrap_or_default(),
        })
        .collect::<Vec<_>>();

    let terminal_width = if let Some((TermWidth(w), _)) = terminal_size() {
        w as usize
    } else {
        80
    };

    let table = Table::new(table_data)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
        .with(Modify::new(Columns::one(6)).with(Width::truncate(60).suffix("...")))
        .with(Width::increase(terminal_width))
        .to_string();
    println!("{}", table);
}

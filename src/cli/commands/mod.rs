pub mod cmd_config;
pub mod cmd_db;
pub mod cmd_generate;
pub mod cmd_mark;
pub mod cmd_migrate;
pub mod cmd_status;
pub mod cmd_version;

use clap::Subcommand;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    cli::commands::{
        cmd_db::DbCommands,
        cmd_generate::GenerateCommand,
        cmd_mark::MarkCommand,
        cmd_migrate::{MigrateCommand, MigrateOneCommand},
        cmd_status::StatusCommand,
        cmd_version::VersionCommand,
    },
    errors::MigrationError,
    utils::ProgressReporter,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a blank migration in a source root
    Generate(GenerateCommand),

    /// Migrate to a version or alias (first, prev, current, next, latest, current+N)
    Migrate(MigrateCommand),

    /// Execute a single migration up or down
    MigrateOne(MigrateOneCommand),

    /// Show the status of the migrations
    Status(StatusCommand),

    /// Add or delete version table records without running migrations
    Mark(MarkCommand),

    /// Manage the metadata tables
    Db {
        #[command(subcommand)]
        action: DbCommands,
    },

    /// Print the resolved configuration
    Config,

    /// Print version
    Version(VersionCommand),
}

pub trait ExitOnErr<T> {
    fn exit_on_err(self, msg: &str) -> T;
}

impl<T, E: std::fmt::Display> ExitOnErr<T> for Result<T, E> {
    fn exit_on_err(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("❌ {}: {}", msg, e);
                std::process::exit(1);
            }
        }
    }
}

/// Terminates the process for a failed command. "Nothing to do" errors are
/// reported as information and exit successfully.
pub fn exit_with(err: anyhow::Error) -> ! {
    match err.downcast_ref::<MigrationError>() {
        Some(e) if e.is_nothing_to_do() => {
            println!("{}", e.to_string().yellow());
            std::process::exit(0);
        }
        Some(e) if e.is_misuse() => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        _ => {
            eprintln!("❌ {:#}", err);
            std::process::exit(1);
        }
    }
}

/// Spinner fed by the returned reporter until it is dropped.
pub fn new_spinner(message: &str) -> (ProgressBar, ProgressReporter) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let (progress, mut rx) = ProgressReporter::channel();
    let spinner_clone = spinner.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            spinner_clone.set_message(msg);
        }
    });

    (spinner, progress)
}

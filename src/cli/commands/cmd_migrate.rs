use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::{
    cli::{
        Context,
        commands::{exit_with, new_spinner},
    },
    services::{MigrateOptions, MigrateOutcome},
    types::Direction,
};

#[derive(Args, Debug)]
pub struct MigrateCommand {
    /// Target version or alias
    #[arg(default_value = "latest")]
    pub version: String,

    /// Show what would run without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not print anything when there is nothing to migrate
    #[arg(long, short)]
    pub quiet: bool,

    /// Write the SQL to a file instead of executing it (defaults to the current directory)
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = ".")]
    pub write_sql: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MigrateOneCommand {
    /// Version to execute
    pub version: String,

    #[arg(long, default_value_t = Direction::Up)]
    pub direction: Direction,

    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = ".")]
    pub write_sql: Option<PathBuf>,
}

pub async fn execute(action: &MigrateCommand, ctx: &Context<'_>) {
    let (spinner, progress) = new_spinner(&format!("Resolving '{}'...", action.version));

    let res = ctx
        .services
        .migration_service
        .migrate(
            &action.version,
            MigrateOptions {
                dry_run: action.dry_run,
                quiet: action.quiet,
                write_sql: action.write_sql.clone(),
            },
            &progress,
        )
        .await;

    spinner.finish_and_clear();
    match res {
        Ok(outcome) => print_outcome(outcome),
        Err(e) => exit_with(e),
    }
}

pub async fn execute_one(action: &MigrateOneCommand, ctx: &Context<'_>) {
    let (spinner, progress) = new_spinner(&format!("Loading version {}...", action.version));

    let res = ctx
        .services
        .migration_service
        .migrate_one(
            &action.version,
            action.direction,
            MigrateOptions {
                dry_run: action.dry_run,
                quiet: false,
                write_sql: action.write_sql.clone(),
            },
            &progress,
        )
        .await;

    spinner.finish_and_clear();
    match res {
        Ok(outcome) => print_outcome(outcome),
        Err(e) => exit_with(e),
    }
}

fn print_outcome(outcome: MigrateOutcome) {
    match outcome {
        MigrateOutcome::NothingToDo(Some(message)) => println!("{}", message.yellow()),
        MigrateOutcome::NothingToDo(None) => {}
        MigrateOutcome::Applied {
            header,
            report,
            sql_file,
        } => {
            println!("{}\n", header.green().bold());
            println!("{}", report);

            if let Some(path) = sql_file {
                println!(
                    "\n{}",
                    format!("SQL written to {}", path.display()).green()
                );
            }

            if let Some(e) = &report.error {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
            if report.cancelled {
                eprintln!("❌ Migration cancelled, remaining migrations were not attempted");
                std::process::exit(1);
            }
        }
    }
}

use clap::Args;
use colored::Colorize;

use crate::{
    cli::{Context, commands::exit_with},
    metadata::MarkOutcome,
};

#[derive(Args, Debug)]
pub struct MarkCommand {
    /// Version to mark, or `all`
    pub version: String,

    /// Record the version as executed
    #[arg(long)]
    pub add: bool,

    /// Remove the version from the version table
    #[arg(long)]
    pub delete: bool,
}

pub async fn execute(action: &MarkCommand, ctx: &Context<'_>) {
    let outcomes = ctx
        .services
        .migration_service
        .mark(&action.version, action.add, action.delete)
        .await
        .unwrap_or_else(|e| exit_with(e));

    for outcome in outcomes {
        match outcome {
            MarkOutcome::Added(_) => println!("  {} {}", "+".green(), outcome),
            MarkOutcome::Deleted(_) | MarkOutcome::Discarded(_) => println!("  {} {}", "-".red(), outcome),
            MarkOutcome::Unchanged(_) => {}
        }
    }
}

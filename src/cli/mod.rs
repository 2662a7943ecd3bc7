mod commands;

use clap::Parser;
use colored::Colorize;

pub use crate::cli::commands::ExitOnErr;
use crate::cli::commands::{
    Commands, cmd_config, cmd_db, cmd_generate, cmd_mark, cmd_migrate, cmd_status, cmd_version,
};
use crate::config::Settings;
use crate::executor::CancelSignal;
use crate::services::AppServices;

pub struct Context<'a> {
    pub settings: &'a Settings,
    pub services: &'a AppServices,
}

#[derive(Parser, Debug)]
#[command(
    name = "strata",
    about = "Strata migration runner",
    long_about = format!(
r#"{} - {}
Migrations are collected from every package under the packages directory."#,
"STRATA".green().bold(),
"Versioned SQL migrations for modular applications.",
))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub async fn execute(&self, settings: &Settings, cancel: CancelSignal) {
        match &self.command {
            Commands::Version(action) => return cmd_version::execute(action),
            Commands::Config => return cmd_config::execute(settings),
            Commands::Db { action } => return cmd_db::execute(action, settings).await,
            _ => {}
        }

        let services = AppServices::new(settings, cancel)
            .await
            .exit_on_err("Failed to initialize services");
        let ctx = Context {
            settings,
            services: &services,
        };

        match &self.command {
            Commands::Generate(action) => cmd_generate::execute(action, &ctx).await,
            Commands::Migrate(action) => cmd_migrate::execute(action, &ctx).await,
            Commands::MigrateOne(action) => cmd_migrate::execute_one(action, &ctx).await,
            Commands::Status(action) => cmd_status::execute(action, &ctx).await,
            Commands::Mark(action) => cmd_mark::execute(action, &ctx).await,
            Commands::Version(_) | Commands::Config | Commands::Db { .. } => {}
        }
    }
}

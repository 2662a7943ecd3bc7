use clap::Subcommand;
use inquire::Confirm;
use sea_orm::Database;

use crate::{
    cli::commands::ExitOnErr,
    config::Settings,
    db::{init_db, migrations},
    repo::MigrationLockRepository,
};

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create or upgrade the version and lock tables
    Sync,

    /// Remove a migration lock left behind by an interrupted run
    Unlock,

    /// Drop the version and lock tables
    Drop {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

pub async fn execute(action: &DbCommands, settings: &Settings) {
    match action {
        DbCommands::Sync => sync(settings).await,
        DbCommands::Unlock => unlock(settings).await,
        DbCommands::Drop { yes } => drop_tables(settings, *yes).await,
    }
}

async fn sync(settings: &Settings) {
    init_db(settings)
        .await
        .exit_on_err("Failed to synchronize metadata tables");
    println!("✅ Metadata tables are up to date");
}

async fn unlock(settings: &Settings) {
    let db = init_db(settings)
        .await
        .exit_on_err("Failed to connect to database");

    let removed = MigrationLockRepository::new(db)
        .force_release()
        .await
        .exit_on_err("Failed to release the migration lock");

    if removed == 0 {
        println!("⚠️ No migration lock was held");
    } else {
        println!("✅ Migration lock released");
    }
}

async fn drop_tables(settings: &Settings, yes: bool) {
    if !yes {
        let confirmed = Confirm::new("Drop the version table? Every migration will look unexecuted.")
            .with_default(false)
            .prompt()
            .exit_on_err("Failed to read confirmation");
        if !confirmed {
            println!("Aborted");
            return;
        }
    }

    let db = Database::connect(&settings.database.url)
        .await
        .exit_on_err("Failed to connect to database");
    migrations::down(&db)
        .await
        .exit_on_err("Failed to drop metadata tables");
    println!("✅ Metadata tables dropped");
}

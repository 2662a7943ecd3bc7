use clap::Args;
use inquire::Select;

use crate::cli::{
    Context,
    commands::{ExitOnErr, exit_with},
};

#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Source root that receives the migration; prompts when omitted
    pub root: Option<String>,
}

pub async fn execute(action: &GenerateCommand, ctx: &Context<'_>) {
    let service = &ctx.services.migration_service;

    let root = match &action.root {
        Some(root) => root.clone(),
        None => {
            let names: Vec<String> = service
                .registry()
                .roots()
                .into_iter()
                .map(|r| r.name)
                .collect();
            if names.is_empty() {
                eprintln!("❌ No source roots found, check STRATA__MIGRATIONS__PACKAGES_DIR");
                std::process::exit(1);
            }
            Select::new("Which root should receive the migration?", names)
                .prompt()
                .exit_on_err("No root selected")
        }
    };

    let path = service.generate(&root).await.unwrap_or_else(|e| exit_with(e));
    println!("✅ Generated new migration file to \"{}\"", path.display());
}

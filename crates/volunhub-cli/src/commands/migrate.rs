//! Database migration management commands.

use clap::{Args, Subcommand};
use tracing::info;

use crate::output;
use volunhub_core::config::AppConfig;
use volunhub_core::error::AppError;
use volunhub_database::migration::run_migrations;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let store = super::open_store(config).await?;

    let result = match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(&store.db).await
        }
    };
    store.close().await;

    result?;
    info!(command = "migrate run", "Migrations applied");
    output::print_success("All migrations applied successfully.");
    Ok(())
}

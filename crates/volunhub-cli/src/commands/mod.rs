//! CLI command definitions and dispatch.

pub mod health;
pub mod leaderboard;
pub mod migrate;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use volunhub_core::config::AppConfig;
use volunhub_core::error::AppError;
use volunhub_database::DataStore;

/// VolunHub: volunteer marketplace data layer tooling
#[derive(Debug, Parser)]
#[command(name = "volunhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Check database connectivity
    Health,
    /// Show the volunteer leaderboard
    Leaderboard(leaderboard::LeaderboardArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config)?;
        crate::init_tracing(&config.logging);

        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Health => health::execute(&config).await,
            Commands::Leaderboard(args) => leaderboard::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: open the data store described by the configuration
pub async fn open_store(config: &AppConfig) -> Result<DataStore, AppError> {
    DataStore::open(&config.database).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["volunhub", "leaderboard", "--limit", "5", "--format", "json"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Leaderboard(args) => assert_eq!(args.limit, 5),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["volunhub", "health"]).unwrap();
        assert_eq!(cli.config, "config/default.toml");
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn test_migrate_requires_subcommand() {
        assert!(Cli::try_parse_from(["volunhub", "migrate"]).is_err());
        assert!(Cli::try_parse_from(["volunhub", "migrate", "run"]).is_ok());
    }
}

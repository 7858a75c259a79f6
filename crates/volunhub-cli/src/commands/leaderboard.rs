//! Volunteer leaderboard command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::output::{self, OutputFormat};
use volunhub_core::config::AppConfig;
use volunhub_core::error::AppError;
use volunhub_entity::stats::VolunteerSummary;

/// Arguments for the leaderboard command
#[derive(Debug, Args)]
pub struct LeaderboardArgs {
    /// Number of volunteers to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: i64,
}

/// Leaderboard display row for table output
#[derive(Debug, Serialize, Tabled)]
struct LeaderboardRow {
    /// Rank, starting at 1
    rank: usize,
    /// Volunteer ID
    id: String,
    /// Display name
    name: String,
    /// Points
    points: i64,
    /// Hours
    hours: f64,
    /// Badges, comma separated
    badges: String,
}

impl LeaderboardRow {
    fn new(rank: usize, volunteer: &VolunteerSummary) -> Self {
        Self {
            rank,
            id: volunteer.id.to_string(),
            name: volunteer.name.clone(),
            points: volunteer.points,
            hours: volunteer.hours,
            badges: volunteer.badges.join(", "),
        }
    }
}

/// Execute the leaderboard command
pub async fn execute(
    args: &LeaderboardArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::open_store(config).await?;
    let volunteers = store.stats.get_leaderboard(args.limit).await;
    store.close().await;

    let rows: Vec<LeaderboardRow> = volunteers?
        .iter()
        .enumerate()
        .map(|(i, v)| LeaderboardRow::new(i + 1, v))
        .collect();
    debug!(limit = args.limit, rows = rows.len(), "Leaderboard loaded");

    output::print_list(&rows, format);
    Ok(())
}

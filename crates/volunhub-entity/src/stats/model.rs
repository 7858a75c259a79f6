//! Volunteer stats models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Aggregate gamification stats owned 1:1 by a volunteer.
///
/// Points and hours only ever grow; badges are append-only and unique
/// per user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VolunteerStats {
    /// Accumulated points.
    pub points: i64,
    /// Accumulated volunteered hours.
    pub hours: f64,
    /// Badges in award order.
    pub badges: Vec<String>,
}

/// A volunteer as listed in directory and leaderboard views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VolunteerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture_url: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub causes: Vec<String>,
    /// Zero when the volunteer has no stats row yet.
    pub points: i64,
    /// Zero when the volunteer has no stats row yet.
    pub hours: f64,
    /// Filled from a batched badge lookup.
    #[sqlx(skip)]
    pub badges: Vec<String>,
}

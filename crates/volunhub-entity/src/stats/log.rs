//! Gamification audit log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What kind of stat mutation a log row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gamification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GamificationKind {
    Points,
    Badge,
    Hours,
}

/// Append-only audit row written for every stat mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GamificationEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: GamificationKind,
    /// Points delta, hours delta, or badge name, rendered as text.
    pub value: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

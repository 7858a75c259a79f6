//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::role::UserRole;
use crate::stats::VolunteerStats;

/// A registered account together with its multi-valued attributes.
///
/// `skills` and `causes` come from the `user_skills` / `user_causes`
/// child tables. `stats` is only populated for volunteers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: UserRole,
    /// Password hash produced by the auth layer.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Profile picture reference.
    pub profile_picture_url: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Whether the user finished onboarding.
    pub onboarding_completed: bool,
    /// Skills, sorted.
    pub skills: Vec<String>,
    /// Causes the user cares about, sorted.
    pub causes: Vec<String>,
    /// Gamification stats (volunteers only).
    #[sqlx(skip)]
    pub stats: Option<VolunteerStats>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Assigned role.
    pub role: UserRole,
    /// Pre-hashed password.
    #[validate(length(min = 1))]
    pub password_hash: String,
    /// Profile picture reference.
    pub profile_picture_url: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// Initial skills.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Initial causes.
    #[serde(default)]
    pub causes: Vec<String>,
    /// Badges granted at sign-up (volunteers only).
    #[serde(default)]
    pub badges: Vec<String>,
}

/// Partial profile update. `None` fields are left untouched; `Some`
/// skill/cause lists replace the stored set entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUser {
    /// New display name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// New profile picture reference.
    pub profile_picture_url: Option<String>,
    /// New biography.
    pub bio: Option<String>,
    /// New onboarding flag.
    pub onboarding_completed: Option<bool>,
    /// Replacement skill set.
    pub skills: Option<Vec<String>>,
    /// Replacement cause set.
    pub causes: Option<Vec<String>>,
}

/// Normalize a multi-valued attribute: trim, drop blanks, dedupe.
pub fn normalize_values(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

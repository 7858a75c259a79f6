//! Opportunity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A volunteering opportunity posted by an organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Opportunity {
    pub id: Uuid,
    /// Owning organization (a user with role `organization`).
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Free-text time commitment, e.g. "2 hours/week".
    pub commitment: String,
    pub category: String,
    /// Points credited to a volunteer marked present.
    pub points_awarded: i32,
    pub image_url: Option<String>,
    /// Required skills from `opportunity_skills`, sorted.
    pub required_skills: Vec<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub event_start_date: Option<DateTime<Utc>>,
    pub event_end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to post an opportunity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOpportunity {
    pub organization_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[validate(length(min = 1))]
    pub commitment: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub points_awarded: i32,
    pub image_url: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub event_start_date: Option<DateTime<Utc>>,
    pub event_end_date: Option<DateTime<Utc>>,
}

/// Partial opportunity update. Every update refreshes `updated_at`;
/// a supplied `required_skills` list replaces the stored set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOpportunity {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    #[validate(length(min = 1))]
    pub commitment: Option<String>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub points_awarded: Option<i32>,
    pub image_url: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub event_start_date: Option<DateTime<Utc>>,
    pub event_end_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_points_rejected() {
        let update = UpdateOpportunity {
            points_awarded: Some(-5),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateOpportunity {
            points_awarded: Some(0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }
}

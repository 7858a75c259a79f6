//! Application entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::status::{ApplicationStatus, Attendance};

/// A volunteer's application to an opportunity.
///
/// `opportunity_title`, `applicant_name` and `applicant_email` are
/// snapshots taken at submission and are never re-synchronized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub opportunity_title: String,
    pub volunteer_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub attendance: Attendance,
    /// Organization's 1–5 rating of the volunteer.
    pub org_rating: Option<i16>,
    /// Hours confirmed by the organization.
    pub hours_logged_by_org: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Data submitted by a volunteer applying to an opportunity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewApplication {
    pub opportunity_id: Uuid,
    pub volunteer_id: Uuid,
    pub resume_url: Option<String>,
    #[validate(length(max = 5000))]
    pub cover_letter: Option<String>,
}

/// Post-event feedback recorded by the organization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PerformanceReport {
    pub attendance: Attendance,
    #[validate(range(min = 1, max = 5))]
    pub org_rating: Option<i16>,
    #[validate(range(min = 0.0))]
    pub hours_logged_by_org: Option<f64>,
}

impl PerformanceReport {
    /// A report marking the volunteer present with optional hours.
    pub fn present(hours: Option<f64>) -> Self {
        Self {
            attendance: Attendance::Present,
            org_rating: None,
            hours_logged_by_org: hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_range() {
        let mut report = PerformanceReport::present(Some(3.0));
        report.org_rating = Some(5);
        assert!(report.validate().is_ok());
        report.org_rating = Some(0);
        assert!(report.validate().is_err());
        report.org_rating = Some(6);
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_negative_hours_rejected() {
        assert!(PerformanceReport::present(Some(-1.0)).validate().is_err());
        assert!(PerformanceReport::present(None).validate().is_ok());
    }
}

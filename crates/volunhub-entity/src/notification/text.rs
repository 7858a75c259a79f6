//! User-facing notification texts and links.

use uuid::Uuid;

use crate::application::ApplicationStatus;

/// Sent to the organization when a volunteer applies.
pub fn application_received(applicant_name: &str, opportunity_title: &str) -> String {
    format!("{applicant_name} applied to \"{opportunity_title}\".")
}

/// Sent to the volunteer when an organization changes an application's status.
pub fn status_changed(status: ApplicationStatus, opportunity_title: &str) -> String {
    match status {
        ApplicationStatus::Submitted => {
            format!("Your application for \"{opportunity_title}\" has been submitted.")
        }
        ApplicationStatus::Accepted => format!(
            "Good news! Your application for \"{opportunity_title}\" has been accepted."
        ),
        ApplicationStatus::Rejected => format!(
            "Your application for \"{opportunity_title}\" was rejected. Thank you for your interest."
        ),
        ApplicationStatus::Completed => {
            format!("Your participation in \"{opportunity_title}\" has been marked completed.")
        }
        ApplicationStatus::Withdrawn => {
            format!("Your application for \"{opportunity_title}\" has been withdrawn.")
        }
    }
}

/// Sent to the volunteer when attendance is recorded as present.
pub fn attendance_credited(opportunity_title: &str, points: i64, hours: Option<f64>) -> String {
    let mut earned = Vec::new();
    if points > 0 {
        earned.push(format!("{points} points"));
    }
    if let Some(hours) = hours.filter(|h| *h > 0.0) {
        earned.push(format!("{hours} hours"));
    }

    if earned.is_empty() {
        format!("Thanks for volunteering at \"{opportunity_title}\"! Your attendance has been recorded.")
    } else {
        format!(
            "Thanks for volunteering at \"{opportunity_title}\"! You earned {}.",
            earned.join(" and ")
        )
    }
}

pub fn application_link(application_id: Uuid) -> String {
    format!("/applications/{application_id}")
}

pub fn opportunity_applications_link(opportunity_id: Uuid) -> String {
    format!("/opportunities/{opportunity_id}/applications")
}

pub fn profile_link() -> String {
    "/profile".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_texts_name_the_status() {
        for (status, word) in [
            (ApplicationStatus::Accepted, "accepted"),
            (ApplicationStatus::Rejected, "rejected"),
            (ApplicationStatus::Completed, "completed"),
            (ApplicationStatus::Withdrawn, "withdrawn"),
        ] {
            let text = status_changed(status, "Beach Cleanup");
            assert!(text.contains(word), "{text}");
            assert!(text.contains("Beach Cleanup"));
        }
    }

    #[test]
    fn test_attendance_text_mentions_points_and_hours() {
        let text = attendance_credited("Food Drive", 50, Some(3.0));
        assert_eq!(
            text,
            "Thanks for volunteering at \"Food Drive\"! You earned 50 points and 3 hours."
        );
    }

    #[test]
    fn test_attendance_text_omits_zero_parts() {
        assert!(!attendance_credited("Food Drive", 0, Some(2.5)).contains("points"));
        assert!(attendance_credited("Food Drive", 0, Some(2.5)).contains("2.5 hours"));
        assert!(attendance_credited("Food Drive", 0, None).contains("attendance has been recorded"));
    }
}

//! Application status state machine and attendance sub-state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use volunhub_core::AppError;

/// Lifecycle state of an application.
///
/// ```text
/// submitted ──► accepted ──► completed
///     │             └──────► withdrawn
///     └───────► rejected
/// ```
///
/// `rejected`, `completed` and `withdrawn` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Submitted,
    Accepted,
    Rejected,
    Completed,
    Withdrawn,
}

impl ApplicationStatus {
    /// Whether `self → next` is a defined transition.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Submitted, Self::Accepted)
                | (Self::Submitted, Self::Rejected)
                | (Self::Accepted, Self::Completed)
                | (Self::Accepted, Self::Withdrawn)
        )
    }

    /// Whether no transition leaves this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Withdrawn)
    }

    /// Whether attendance may still be recorded.
    ///
    /// Attendance can be recorded (and re-recorded) for submitted,
    /// accepted and completed applications, never for rejected or
    /// withdrawn ones.
    pub fn accepts_attendance(&self) -> bool {
        !matches!(self, Self::Rejected | Self::Withdrawn)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(Self::Submitted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(AppError::validation(format!(
                "Invalid application status: '{s}'"
            ))),
        }
    }
}

/// Attendance recorded by the organization after the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    #[default]
    Pending,
    Present,
    Absent,
}

impl Attendance {
    /// The status forced by recording this attendance, if any.
    pub fn implied_status(&self) -> Option<ApplicationStatus> {
        match self {
            Self::Present => Some(ApplicationStatus::Completed),
            Self::Pending | Self::Absent => None,
        }
    }

    /// Whether attendance may be re-recorded as `next`.
    ///
    /// `present` is final: it has already been credited to the volunteer.
    pub fn can_change_to(&self, next: Attendance) -> bool {
        *self != Self::Present || next == Self::Present
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

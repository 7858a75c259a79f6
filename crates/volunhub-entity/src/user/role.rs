//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to an account at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Applies to opportunities and earns points, hours and badges.
    Volunteer,
    /// Posts opportunities and reviews applications.
    Organization,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Whether accounts with this role own a stats row.
    pub fn has_stats(&self) -> bool {
        matches!(self, Self::Volunteer)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Volunteer => "volunteer",
            Self::Organization => "organization",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = volunhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "volunteer" => Ok(Self::Volunteer),
            "organization" => Ok(Self::Organization),
            "admin" => Ok(Self::Admin),
            _ => Err(volunhub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: volunteer, organization, admin"
            ))),
        }
    }
}

//! Sort keys for the volunteer directory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use volunhub_core::AppError;
use volunhub_core::types::SortDirection;

/// Ordering applied by `get_volunteers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerSort {
    #[default]
    PointsDesc,
    PointsAsc,
    NameAsc,
    NameDesc,
    HoursDesc,
    HoursAsc,
}

impl VolunteerSort {
    /// SQL `ORDER BY` clause body. Ties always break on name then id.
    pub fn order_by(&self) -> String {
        let (column, direction) = match self {
            Self::PointsDesc => ("points", SortDirection::Desc),
            Self::PointsAsc => ("points", SortDirection::Asc),
            Self::NameAsc => ("name", SortDirection::Asc),
            Self::NameDesc => ("name", SortDirection::Desc),
            Self::HoursDesc => ("hours", SortDirection::Desc),
            Self::HoursAsc => ("hours", SortDirection::Asc),
        };
        match column {
            "name" => format!("u.name {}, u.id ASC", direction.as_sql()),
            _ => format!("{column} {}, u.name ASC, u.id ASC", direction.as_sql()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointsDesc => "points_desc",
            Self::PointsAsc => "points_asc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::HoursDesc => "hours_desc",
            Self::HoursAsc => "hours_asc",
        }
    }
}

impl fmt::Display for VolunteerSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VolunteerSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "points_desc" => Ok(Self::PointsDesc),
            "points_asc" => Ok(Self::PointsAsc),
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            "hours_desc" => Ok(Self::HoursDesc),
            "hours_asc" => Ok(Self::HoursAsc),
            _ => Err(AppError::validation(format!("Unknown volunteer sort key: '{s}'"))),
        }
    }
}

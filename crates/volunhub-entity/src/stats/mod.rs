//! Volunteer gamification entities.

pub mod log;
pub mod model;
pub mod sort;

pub use log::{GamificationEntry, GamificationKind};
pub use model::{VolunteerStats, VolunteerSummary};
pub use sort::VolunteerSort;

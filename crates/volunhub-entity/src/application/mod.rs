//! Application lifecycle entities.

pub mod model;
pub mod status;

pub use model::{Application, NewApplication, PerformanceReport};
pub use status::{ApplicationStatus, Attendance};

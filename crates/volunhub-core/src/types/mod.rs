//! Common types shared by the entity and database crates.

pub mod pattern;
pub mod sorting;

pub use pattern::{contains_pattern, non_blank};
pub use sorting::SortDirection;

//! # volunhub-core
//!
//! Core crate for VolunHub. Contains configuration schemas, shared
//! query helper types, and the unified error system used by the
//! entity and database crates.
//!
//! This crate has **no** internal dependencies on other VolunHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

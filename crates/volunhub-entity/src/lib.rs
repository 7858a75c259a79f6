//! # volunhub-entity
//!
//! Domain entity models for VolunHub. Row structs derive
//! `sqlx::FromRow`; input structs derive `validator::Validate` so the
//! store layer can refuse malformed data before touching the database.

pub mod application;
pub mod conversation;
pub mod notification;
pub mod opportunity;
pub mod stats;
pub mod user;

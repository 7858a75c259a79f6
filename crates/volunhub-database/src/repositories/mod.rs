//! Repository implementations for all VolunHub stores.
//!
//! Each repository exposes the public operations of one store. Statement
//! helpers that other stores reuse inside their own transactions take a
//! `&mut PgConnection` and live next to the repository that owns the
//! table.

pub mod application;
pub mod attributes;
pub mod conversation;
pub mod notification;
pub mod opportunity;
pub mod stats;
pub mod user;

pub use application::ApplicationRepository;
pub use conversation::ConversationRepository;
pub use notification::NotificationRepository;
pub use opportunity::OpportunityRepository;
pub use stats::StatsRepository;
pub use user::UserRepository;

use sqlx::error::ErrorKind as DbErrorKind;

use volunhub_core::error::AppError;

/// Map a write failure, turning a foreign-key violation into `NotFound`.
pub(crate) fn missing_parent(
    context: &str,
    missing: impl FnOnce() -> String,
) -> impl FnOnce(sqlx::Error) -> AppError {
    let context = context.to_string();
    move |e| match e {
        sqlx::Error::Database(ref db_err) if db_err.kind() == DbErrorKind::ForeignKeyViolation => {
            AppError::not_found(missing())
        }
        _ => AppError::from_sqlx(context, e),
    }
}

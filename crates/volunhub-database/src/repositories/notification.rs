//! Notification repository implementation.

use sqlx::{Executor, Postgres};
use tracing::info;
use uuid::Uuid;

use volunhub_core::error::AppError;
use volunhub_core::result::AppResult;
use volunhub_entity::notification::Notification;

use super::missing_parent;
use crate::connection::Database;

/// Maximum number of notifications returned by the feed query.
pub const FEED_LIMIT: i64 = 50;

/// Repository for the per-user notification log.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: Database,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append an unread notification for a user.
    pub async fn create_notification(
        &self,
        user_id: Uuid,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<Notification> {
        if message.trim().is_empty() {
            return Err(AppError::validation("Notification message cannot be empty"));
        }
        insert(self.db.pool(), user_id, message, link).await
    }

    /// The newest notifications for a user, at most [`FEED_LIMIT`].
    pub async fn get_notifications_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(FEED_LIMIT)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list notifications", e))
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to count unread notifications", e))
    }

    /// Mark one notification as read.
    ///
    /// Gated on ownership: a notification that does not exist or belongs
    /// to someone else yields `NotFound` and nothing is changed.
    pub async fn mark_notification_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to mark notification read", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Notification {notification_id} not found"
            )));
        }
        Ok(())
    }

    /// Mark every unread notification of a user as read. Returns how many
    /// notifications changed.
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to mark all notifications read", e))?;

        info!(user_id = %user_id, count = result.rows_affected(), "Notifications marked read");
        Ok(result.rows_affected())
    }
}

/// Insert a notification through any executor, including an open
/// transaction.
pub(crate) async fn insert<'e, E>(
    executor: E,
    user_id: Uuid,
    message: &str,
    link: Option<&str>,
) -> AppResult<Notification>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, Notification>(
        "INSERT INTO notifications (user_id, message, link) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(message)
    .bind(link)
    .fetch_one(executor)
    .await
    .map_err(missing_parent("Failed to create notification", move || {
        format!("User {user_id} not found")
    }))
}

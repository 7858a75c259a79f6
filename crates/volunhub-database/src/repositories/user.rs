//! User repository implementation.

use sqlx::PgConnection;
use sqlx::error::ErrorKind as DbErrorKind;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use volunhub_core::error::AppError;
use volunhub_core::result::AppResult;
use volunhub_entity::user::{NewUser, UpdateUser, User};

use super::attributes::{self, USER_CAUSES, USER_SKILLS};
use super::stats;
use crate::connection::Database;

/// Column list shared by every user read. Skills and causes are folded
/// into sorted arrays from their child tables.
const USER_COLUMNS: &str = "u.id, u.email, u.name, u.role, u.password_hash, \
    u.profile_picture_url, u.bio, u.onboarding_completed, \
    ARRAY(SELECT sk.skill FROM user_skills sk WHERE sk.user_id = u.id ORDER BY sk.skill) AS skills, \
    ARRAY(SELECT ca.cause FROM user_causes ca WHERE ca.user_id = u.id ORDER BY ca.cause) AS causes, \
    u.created_at, u.updated_at";

/// Reason recorded in the audit log for badges granted at sign-up.
const SIGN_UP_REASON: &str = "Granted at sign-up";

/// Repository for user accounts and their multi-valued attributes.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Find a user by primary key.
    pub async fn get_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut conn = self.db.acquire().await?;
        load_user(&mut conn, id).await
    }

    /// Find a user by email (case-insensitive).
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut conn = self.db.acquire().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE LOWER(u.email) = LOWER($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to find user by email", e))?;

        match user {
            Some(user) => attach_stats(&mut conn, user).await.map(Some),
            None => Ok(None),
        }
    }

    /// Create a user with its skills and causes. Volunteers also get a
    /// zeroed stats row and any seed badges.
    pub async fn create_user(&self, data: NewUser) -> AppResult<User> {
        data.validate()?;
        if !data.role.has_stats() && !data.badges.is_empty() {
            return Err(AppError::validation(format!(
                "Badges can only be granted to volunteers, not to role '{}'",
                data.role
            )));
        }

        let user = self
            .db
            .with_transaction("create_user", move |conn| {
                Box::pin(async move {
                    let email = data.email.trim().to_lowercase();
                    let id: Uuid = sqlx::query_scalar(
                        "INSERT INTO users (email, name, role, password_hash, profile_picture_url, bio) \
                         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                    )
                    .bind(&email)
                    .bind(data.name.trim())
                    .bind(data.role)
                    .bind(&data.password_hash)
                    .bind(&data.profile_picture_url)
                    .bind(&data.bio)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(|e| map_unique_email(e, &email))?;

                    attributes::insert_values(conn, USER_SKILLS, id, &data.skills).await?;
                    attributes::insert_values(conn, USER_CAUSES, id, &data.causes).await?;

                    if data.role.has_stats() {
                        stats::ensure_stats(conn, id).await?;
                        for badge in data.badges.iter().map(|b| b.trim()).filter(|b| !b.is_empty()) {
                            stats::insert_badge(conn, id, badge, SIGN_UP_REASON).await?;
                        }
                    }

                    load_user(conn, id)
                        .await?
                        .ok_or_else(|| AppError::internal("User row missing after insert"))
                })
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Apply a partial profile update. Supplied skill or cause lists replace
    /// the stored set inside the same transaction.
    pub async fn update_user(&self, id: Uuid, data: UpdateUser) -> AppResult<User> {
        data.validate()?;

        let user = self
            .db
            .with_transaction("update_user", move |conn| {
                Box::pin(async move {
                    let updated: Option<Uuid> = sqlx::query_scalar(
                        "UPDATE users SET \
                         name = COALESCE($2, name), \
                         profile_picture_url = COALESCE($3, profile_picture_url), \
                         bio = COALESCE($4, bio), \
                         onboarding_completed = COALESCE($5, onboarding_completed), \
                         updated_at = NOW() \
                         WHERE id = $1 RETURNING id",
                    )
                    .bind(id)
                    .bind(data.name.as_deref().map(str::trim))
                    .bind(&data.profile_picture_url)
                    .bind(&data.bio)
                    .bind(data.onboarding_completed)
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(|e| AppError::from_sqlx("Failed to update user", e))?;

                    if updated.is_none() {
                        return Err(AppError::not_found(format!("User {id} not found")));
                    }

                    if let Some(skills) = &data.skills {
                        attributes::replace_values(conn, USER_SKILLS, id, skills).await?;
                    }
                    if let Some(causes) = &data.causes {
                        attributes::replace_values(conn, USER_CAUSES, id, causes).await?;
                    }

                    load_user(conn, id)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
                })
            })
            .await?;

        info!(user_id = %id, "User updated");
        Ok(user)
    }
}

/// Load one user with attributes and, for volunteers, stats.
pub(crate) async fn load_user(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to find user by id", e))?;

    match user {
        Some(user) => attach_stats(conn, user).await.map(Some),
        None => Ok(None),
    }
}

async fn attach_stats(conn: &mut PgConnection, mut user: User) -> AppResult<User> {
    if user.role.has_stats() {
        user.stats = Some(stats::load_stats(conn, user.id).await?.unwrap_or_default());
    }
    Ok(user)
}

fn map_unique_email(e: sqlx::Error, email: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.kind() == DbErrorKind::UniqueViolation
                && db_err.constraint() == Some("users_email_key") =>
        {
            AppError::conflict(format!("Email '{email}' is already registered"))
        }
        _ => AppError::from_sqlx("Failed to create user", e),
    }
}

//! Volunteer stats, badges and the gamification audit log.

use std::collections::HashMap;

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use volunhub_core::error::AppError;
use volunhub_core::result::AppResult;
use volunhub_core::types::{contains_pattern, non_blank};
use volunhub_entity::stats::{
    GamificationEntry, GamificationKind, VolunteerSort, VolunteerStats, VolunteerSummary,
};
use volunhub_entity::user::UserRole;

use super::missing_parent;
use crate::connection::Database;

/// Repository for gamification stats and the volunteer directory.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    db: Database,
}

impl StatsRepository {
    /// Create a new stats repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Credit points to a volunteer, creating the stats row on first award.
    pub async fn add_points(&self, user_id: Uuid, amount: i64, reason: &str) -> AppResult<VolunteerStats> {
        if amount < 0 {
            return Err(AppError::validation(format!(
                "Points delta must not be negative (got {amount})"
            )));
        }
        let reason = reason.to_string();

        let stats = self
            .db
            .with_transaction("add_points", move |conn| {
                Box::pin(async move {
                    require_volunteer(conn, user_id).await?;
                    increment_points(conn, user_id, amount, &reason).await?;
                    load_stats(conn, user_id)
                        .await?
                        .ok_or_else(|| AppError::internal("Stats row missing after upsert"))
                })
            })
            .await?;

        info!(user_id = %user_id, amount, total = stats.points, "Points awarded");
        Ok(stats)
    }

    /// Credit volunteered hours, creating the stats row on first award.
    pub async fn log_hours(&self, user_id: Uuid, amount: f64, reason: &str) -> AppResult<VolunteerStats> {
        validate_hours(amount)?;
        let reason = reason.to_string();

        let stats = self
            .db
            .with_transaction("log_hours", move |conn| {
                Box::pin(async move {
                    require_volunteer(conn, user_id).await?;
                    increment_hours(conn, user_id, amount, &reason).await?;
                    load_stats(conn, user_id)
                        .await?
                        .ok_or_else(|| AppError::internal("Stats row missing after upsert"))
                })
            })
            .await?;

        info!(user_id = %user_id, amount, total = stats.hours, "Hours logged");
        Ok(stats)
    }

    /// Award a badge once. Returns `false` when the volunteer already had it,
    /// in which case nothing is written.
    pub async fn award_badge(&self, user_id: Uuid, badge: &str, reason: &str) -> AppResult<bool> {
        let badge = badge.trim().to_string();
        if badge.is_empty() {
            return Err(AppError::validation("Badge name cannot be empty"));
        }
        let reason = reason.to_string();
        let log_badge = badge.clone();

        let awarded = self
            .db
            .with_transaction("award_badge", move |conn| {
                Box::pin(async move {
                    require_volunteer(conn, user_id).await?;
                    insert_badge(conn, user_id, &badge, &reason).await
                })
            })
            .await?;

        if awarded {
            info!(user_id = %user_id, badge = %log_badge, "Badge awarded");
        }
        Ok(awarded)
    }

    /// Current stats of a volunteer, or `None` if nothing was ever awarded.
    pub async fn get_stats(&self, user_id: Uuid) -> AppResult<Option<VolunteerStats>> {
        let mut conn = self.db.acquire().await?;
        load_stats(&mut conn, user_id).await
    }

    /// The audit trail of a volunteer's stat mutations, newest first.
    pub async fn get_gamification_log(&self, user_id: Uuid) -> AppResult<Vec<GamificationEntry>> {
        sqlx::query_as::<_, GamificationEntry>(
            "SELECT * FROM gamification_log WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to load gamification log", e))
    }

    /// Volunteer directory with optional keyword filter over name and bio.
    pub async fn get_volunteers(
        &self,
        keywords: Option<&str>,
        sort: VolunteerSort,
    ) -> AppResult<Vec<VolunteerSummary>> {
        self.directory(keywords, sort, None).await
    }

    /// Top volunteers by points.
    pub async fn get_leaderboard(&self, limit: i64) -> AppResult<Vec<VolunteerSummary>> {
        if limit <= 0 {
            return Err(AppError::validation("Leaderboard limit must be positive"));
        }
        self.directory(None, VolunteerSort::PointsDesc, Some(limit)).await
    }

    async fn directory(
        &self,
        keywords: Option<&str>,
        sort: VolunteerSort,
        limit: Option<i64>,
    ) -> AppResult<Vec<VolunteerSummary>> {
        let mut conn = self.db.acquire().await?;

        let mut volunteers = directory_query(keywords, sort, limit)
            .build_query_as::<VolunteerSummary>()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to list volunteers", e))?;

        if volunteers.is_empty() {
            return Ok(volunteers);
        }

        let ids: Vec<Uuid> = volunteers.iter().map(|v| v.id).collect();
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT user_id, badge FROM volunteer_badges WHERE user_id = ANY($1) \
             ORDER BY awarded_at, badge",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to load badges", e))?;

        let mut badges: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (user_id, badge) in rows {
            badges.entry(user_id).or_default().push(badge);
        }
        for volunteer in &mut volunteers {
            volunteer.badges = badges.remove(&volunteer.id).unwrap_or_default();
        }

        Ok(volunteers)
    }
}

fn directory_query(
    keywords: Option<&str>,
    sort: VolunteerSort,
    limit: Option<i64>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT u.id, u.name, u.email, u.profile_picture_url, u.bio, \
         ARRAY(SELECT sk.skill FROM user_skills sk WHERE sk.user_id = u.id ORDER BY sk.skill) AS skills, \
         ARRAY(SELECT ca.cause FROM user_causes ca WHERE ca.user_id = u.id ORDER BY ca.cause) AS causes, \
         COALESCE(s.points, 0) AS points, COALESCE(s.hours, 0) AS hours \
         FROM users u LEFT JOIN volunteer_stats s ON s.user_id = u.id \
         WHERE u.role = 'volunteer'",
    );

    if let Some(keywords) = non_blank(keywords) {
        let pattern = contains_pattern(keywords);
        qb.push(" AND (u.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR COALESCE(u.bio, '') ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY ").push(sort.order_by());

    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    qb
}

fn validate_hours(amount: f64) -> AppResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(AppError::validation(format!(
            "Hours delta must be a non-negative number (got {amount})"
        )));
    }
    Ok(())
}

/// Fail unless `user_id` names an existing volunteer.
async fn require_volunteer(conn: &mut PgConnection, user_id: Uuid) -> AppResult<()> {
    let role: UserRole = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to look up user role", e))?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

    if !role.has_stats() {
        return Err(AppError::validation(format!(
            "Only volunteers earn points, hours and badges (user {user_id} is '{role}')"
        )));
    }
    Ok(())
}

/// Load stats and badges for one volunteer.
pub(crate) async fn load_stats(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Option<VolunteerStats>> {
    sqlx::query_as::<_, VolunteerStats>(
        "SELECT s.points, s.hours, \
         ARRAY(SELECT b.badge FROM volunteer_badges b WHERE b.user_id = s.user_id \
               ORDER BY b.awarded_at, b.badge) AS badges \
         FROM volunteer_stats s WHERE s.user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to load volunteer stats", e))
}

/// Create a zeroed stats row if the volunteer has none.
pub(crate) async fn ensure_stats(conn: &mut PgConnection, user_id: Uuid) -> AppResult<()> {
    sqlx::query("INSERT INTO volunteer_stats (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(missing_parent("Failed to create volunteer stats", move || {
            format!("User {user_id} not found")
        }))?;
    Ok(())
}

/// Add `amount` points as a relative delta and write the audit row.
pub(crate) async fn increment_points(
    conn: &mut PgConnection,
    user_id: Uuid,
    amount: i64,
    reason: &str,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO volunteer_stats (user_id, points) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE \
         SET points = volunteer_stats.points + EXCLUDED.points, updated_at = NOW()",
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut *conn)
    .await
    .map_err(missing_parent("Failed to add points", move || {
        format!("User {user_id} not found")
    }))?;

    append_log(conn, user_id, GamificationKind::Points, &amount.to_string(), reason).await
}

/// Add `amount` hours as a relative delta and write the audit row.
pub(crate) async fn increment_hours(
    conn: &mut PgConnection,
    user_id: Uuid,
    amount: f64,
    reason: &str,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO volunteer_stats (user_id, hours) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE \
         SET hours = volunteer_stats.hours + EXCLUDED.hours, updated_at = NOW()",
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut *conn)
    .await
    .map_err(missing_parent("Failed to log hours", move || {
        format!("User {user_id} not found")
    }))?;

    append_log(conn, user_id, GamificationKind::Hours, &amount.to_string(), reason).await
}

/// Insert a badge unless the volunteer already holds it. The audit row is
/// only written for a new badge.
pub(crate) async fn insert_badge(
    conn: &mut PgConnection,
    user_id: Uuid,
    badge: &str,
    reason: &str,
) -> AppResult<bool> {
    ensure_stats(conn, user_id).await?;

    let result = sqlx::query(
        "INSERT INTO volunteer_badges (user_id, badge) VALUES ($1, $2) \
         ON CONFLICT (user_id, badge) DO NOTHING",
    )
    .bind(user_id)
    .bind(badge)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to award badge", e))?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE volunteer_stats SET updated_at = NOW() WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to touch volunteer stats", e))?;

    append_log(conn, user_id, GamificationKind::Badge, badge, reason).await?;
    Ok(true)
}

async fn append_log(
    conn: &mut PgConnection,
    user_id: Uuid,
    kind: GamificationKind,
    value: &str,
    reason: &str,
) -> AppResult<()> {
    sqlx::query("INSERT INTO gamification_log (user_id, kind, value, reason) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(kind)
        .bind(value)
        .bind(reason)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to write gamification log", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_query_without_filters() {
        let qb = directory_query(None, VolunteerSort::default(), None);
        let sql = qb.sql();
        assert!(sql.contains("WHERE u.role = 'volunteer' ORDER BY points DESC"));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn test_directory_query_keyword_and_limit() {
        let qb = directory_query(Some(" garden "), VolunteerSort::HoursAsc, Some(10));
        let sql = qb.sql();
        assert!(sql.contains("AND (u.name ILIKE $1 OR COALESCE(u.bio, '') ILIKE $2)"));
        assert!(sql.contains("ORDER BY hours ASC, u.name ASC, u.id ASC LIMIT $3"));
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let qb = directory_query(Some("   "), VolunteerSort::NameAsc, None);
        assert!(!qb.sql().contains("ILIKE"));
    }

    #[test]
    fn test_validate_hours() {
        assert!(validate_hours(0.0).is_ok());
        assert!(validate_hours(2.5).is_ok());
        assert!(validate_hours(-0.5).is_err());
        assert!(validate_hours(f64::NAN).is_err());
        assert!(validate_hours(f64::INFINITY).is_err());
    }
}

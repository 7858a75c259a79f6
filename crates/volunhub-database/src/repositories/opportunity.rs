//! Opportunity catalog repository.

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use volunhub_core::error::AppError;
use volunhub_core::result::AppResult;
use volunhub_core::types::{contains_pattern, non_blank};
use volunhub_entity::opportunity::{NewOpportunity, Opportunity, OpportunityFilter, UpdateOpportunity};
use volunhub_entity::user::UserRole;

use super::attributes::{self, OPPORTUNITY_SKILLS};
use crate::connection::Database;

const OPPORTUNITY_COLUMNS: &str = "o.id, o.organization_id, o.title, o.description, o.location, \
    o.commitment, o.category, o.points_awarded, o.image_url, \
    ARRAY(SELECT os.skill FROM opportunity_skills os WHERE os.opportunity_id = o.id ORDER BY os.skill) \
    AS required_skills, \
    o.application_deadline, o.event_start_date, o.event_end_date, o.created_at, o.updated_at";

/// Repository for opportunity postings.
#[derive(Debug, Clone)]
pub struct OpportunityRepository {
    db: Database,
}

impl OpportunityRepository {
    /// Create a new opportunity repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List opportunities matching every supplied filter, newest first.
    pub async fn get_opportunities(&self, filter: &OpportunityFilter) -> AppResult<Vec<Opportunity>> {
        listing_query(filter)
            .build_query_as::<Opportunity>()
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to list opportunities", e))
    }

    /// Find an opportunity by primary key.
    pub async fn get_opportunity_by_id(&self, id: Uuid) -> AppResult<Option<Opportunity>> {
        let mut conn = self.db.acquire().await?;
        load_opportunity(&mut conn, id).await
    }

    /// Post a new opportunity on behalf of an organization.
    pub async fn create_opportunity(&self, data: NewOpportunity) -> AppResult<Opportunity> {
        data.validate()?;

        let opportunity = self
            .db
            .with_transaction("create_opportunity", move |conn| {
                Box::pin(async move {
                    ensure_organization(conn, data.organization_id).await?;

                    let id: Uuid = sqlx::query_scalar(
                        "INSERT INTO opportunities (organization_id, title, description, location, \
                         commitment, category, points_awarded, image_url, application_deadline, \
                         event_start_date, event_end_date) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING id",
                    )
                    .bind(data.organization_id)
                    .bind(data.title.trim())
                    .bind(&data.description)
                    .bind(data.location.trim())
                    .bind(data.commitment.trim())
                    .bind(data.category.trim())
                    .bind(data.points_awarded)
                    .bind(&data.image_url)
                    .bind(data.application_deadline)
                    .bind(data.event_start_date)
                    .bind(data.event_end_date)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(|e| AppError::from_sqlx("Failed to create opportunity", e))?;

                    attributes::insert_values(conn, OPPORTUNITY_SKILLS, id, &data.required_skills)
                        .await?;

                    load_opportunity(conn, id)
                        .await?
                        .ok_or_else(|| AppError::internal("Opportunity row missing after insert"))
                })
            })
            .await?;

        info!(
            opportunity_id = %opportunity.id,
            organization_id = %opportunity.organization_id,
            "Opportunity created"
        );
        Ok(opportunity)
    }

    /// Apply a partial update. The updated timestamp is always refreshed and
    /// a supplied skill list replaces the stored set.
    pub async fn update_opportunity(&self, id: Uuid, data: UpdateOpportunity) -> AppResult<Opportunity> {
        data.validate()?;

        let opportunity = self
            .db
            .with_transaction("update_opportunity", move |conn| {
                Box::pin(async move {
                    let updated: Option<Uuid> = sqlx::query_scalar(
                        "UPDATE opportunities SET \
                         title = COALESCE($2, title), \
                         description = COALESCE($3, description), \
                         location = COALESCE($4, location), \
                         commitment = COALESCE($5, commitment), \
                         category = COALESCE($6, category), \
                         points_awarded = COALESCE($7, points_awarded), \
                         image_url = COALESCE($8, image_url), \
                         application_deadline = COALESCE($9, application_deadline), \
                         event_start_date = COALESCE($10, event_start_date), \
                         event_end_date = COALESCE($11, event_end_date), \
                         updated_at = NOW() \
                         WHERE id = $1 RETURNING id",
                    )
                    .bind(id)
                    .bind(data.title.as_deref().map(str::trim))
                    .bind(&data.description)
                    .bind(data.location.as_deref().map(str::trim))
                    .bind(data.commitment.as_deref().map(str::trim))
                    .bind(data.category.as_deref().map(str::trim))
                    .bind(data.points_awarded)
                    .bind(&data.image_url)
                    .bind(data.application_deadline)
                    .bind(data.event_start_date)
                    .bind(data.event_end_date)
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(|e| AppError::from_sqlx("Failed to update opportunity", e))?;

                    if updated.is_none() {
                        return Err(AppError::not_found(format!("Opportunity {id} not found")));
                    }

                    if let Some(skills) = &data.required_skills {
                        attributes::replace_values(conn, OPPORTUNITY_SKILLS, id, skills).await?;
                    }

                    load_opportunity(conn, id)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("Opportunity {id} not found")))
                })
            })
            .await?;

        info!(opportunity_id = %id, "Opportunity updated");
        Ok(opportunity)
    }

    /// Delete an opportunity. Skill rows go first, then the posting itself
    /// (its applications cascade with it).
    pub async fn delete_opportunity(&self, id: Uuid) -> AppResult<()> {
        self.db
            .with_transaction("delete_opportunity", move |conn| {
                Box::pin(async move {
                    attributes::delete_values(conn, OPPORTUNITY_SKILLS, id).await?;

                    let result = sqlx::query("DELETE FROM opportunities WHERE id = $1")
                        .bind(id)
                        .execute(&mut *conn)
                        .await
                        .map_err(|e| AppError::from_sqlx("Failed to delete opportunity", e))?;

                    if result.rows_affected() == 0 {
                        return Err(AppError::not_found(format!("Opportunity {id} not found")));
                    }
                    Ok(())
                })
            })
            .await?;

        info!(opportunity_id = %id, "Opportunity deleted");
        Ok(())
    }
}

/// Build the listing query. Each filter is appended only when supplied and
/// non-blank.
fn listing_query(filter: &OpportunityFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities o WHERE TRUE"
    ));

    if let Some(keyword) = non_blank(filter.keyword.as_deref()) {
        let pattern = contains_pattern(keyword);
        qb.push(" AND (o.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR o.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = non_blank(filter.category.as_deref()) {
        qb.push(" AND o.category = ").push_bind(category.to_string());
    }
    if let Some(location) = non_blank(filter.location.as_deref()) {
        qb.push(" AND o.location ILIKE ")
            .push_bind(contains_pattern(location));
    }
    if let Some(commitment) = non_blank(filter.commitment.as_deref()) {
        qb.push(" AND o.commitment = ").push_bind(commitment.to_string());
    }
    if let Some(organization_id) = filter.organization_id {
        qb.push(" AND o.organization_id = ").push_bind(organization_id);
    }

    qb.push(" ORDER BY o.created_at DESC, o.id");
    qb
}

/// Load one opportunity with its required skills.
pub(crate) async fn load_opportunity(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Opportunity>> {
    sqlx::query_as::<_, Opportunity>(&format!(
        "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities o WHERE o.id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to find opportunity", e))
}

async fn ensure_organization(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
    let role: Option<UserRole> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to look up organization", e))?;

    match role {
        None => Err(AppError::not_found(format!("Organization {id} not found"))),
        Some(UserRole::Volunteer) => Err(AppError::validation(format!(
            "User {id} is a volunteer and cannot post opportunities"
        ))),
        Some(_) => Ok(()),
    }
}

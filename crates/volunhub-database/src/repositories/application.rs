//! Application lifecycle repository.
//!
//! Every state change writes its side effects (notifications, stat
//! credits, the accepted-application conversation) inside the same
//! transaction as the application row itself.

use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use volunhub_core::error::AppError;
use volunhub_core::result::AppResult;
use volunhub_entity::application::{
    Application, ApplicationStatus, Attendance, NewApplication, PerformanceReport,
};
use volunhub_entity::notification::text;
use volunhub_entity::user::UserRole;

use super::{conversation, notification, stats};
use crate::connection::Database;

/// Repository for volunteer applications.
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    db: Database,
}

/// What a performance recording changed, used for logging.
#[derive(Debug, Default, Clone, Copy)]
struct Credit {
    points: i64,
    hours: f64,
}

impl ApplicationRepository {
    /// Create a new application repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Submit an application and notify the owning organization.
    ///
    /// The opportunity title and the applicant's name and email are copied
    /// onto the application so later edits do not rewrite history.
    pub async fn submit_volunteer_application(&self, data: NewApplication) -> AppResult<Application> {
        data.validate()?;

        let application = self
            .db
            .with_transaction("submit_volunteer_application", move |conn| {
                Box::pin(async move {
                    let (opportunity_title, organization_id): (String, Uuid) = sqlx::query_as(
                        "SELECT title, organization_id FROM opportunities WHERE id = $1",
                    )
                    .bind(data.opportunity_id)
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(|e| AppError::from_sqlx("Failed to look up opportunity", e))?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Opportunity {} not found", data.opportunity_id))
                    })?;

                    let (applicant_name, applicant_email, role): (String, String, UserRole) =
                        sqlx::query_as("SELECT name, email, role FROM users WHERE id = $1")
                            .bind(data.volunteer_id)
                            .fetch_optional(&mut *conn)
                            .await
                            .map_err(|e| AppError::from_sqlx("Failed to look up applicant", e))?
                            .ok_or_else(|| {
                                AppError::not_found(format!("User {} not found", data.volunteer_id))
                            })?;

                    if role != UserRole::Volunteer {
                        return Err(AppError::validation(format!(
                            "Only volunteers can apply (user {} is '{role}')",
                            data.volunteer_id
                        )));
                    }

                    let application = sqlx::query_as::<_, Application>(
                        "INSERT INTO applications (opportunity_id, opportunity_title, volunteer_id, \
                         applicant_name, applicant_email, resume_url, cover_letter) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
                    )
                    .bind(data.opportunity_id)
                    .bind(&opportunity_title)
                    .bind(data.volunteer_id)
                    .bind(&applicant_name)
                    .bind(&applicant_email)
                    .bind(&data.resume_url)
                    .bind(&data.cover_letter)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(|e| AppError::from_sqlx("Failed to insert application", e))?;

                    notification::insert(
                        &mut *conn,
                        organization_id,
                        &text::application_received(&applicant_name, &opportunity_title),
                        Some(&text::opportunity_applications_link(data.opportunity_id)),
                    )
                    .await?;

                    Ok(application)
                })
            })
            .await?;

        info!(
            application_id = %application.id,
            opportunity_id = %application.opportunity_id,
            volunteer_id = %application.volunteer_id,
            "Application submitted"
        );
        Ok(application)
    }

    /// Move an application along its state machine and notify the
    /// volunteer. Accepting also opens (or reuses) the conversation between
    /// the organization and the volunteer.
    pub async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> AppResult<Application> {
        let application = self
            .db
            .with_transaction("update_application_status", move |conn| {
                Box::pin(async move {
                    let current = require_application(conn, application_id).await?;

                    if !current.status.can_transition_to(status) {
                        return Err(AppError::validation(format!(
                            "Cannot move application {application_id} from '{}' to '{status}'",
                            current.status
                        )));
                    }

                    let updated = sqlx::query_as::<_, Application>(
                        "UPDATE applications SET status = $2, updated_at = NOW() \
                         WHERE id = $1 RETURNING *",
                    )
                    .bind(application_id)
                    .bind(status)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(|e| AppError::from_sqlx("Failed to update application status", e))?;

                    notification::insert(
                        &mut *conn,
                        updated.volunteer_id,
                        &text::status_changed(status, &updated.opportunity_title),
                        Some(&text::application_link(application_id)),
                    )
                    .await?;

                    if status == ApplicationStatus::Accepted {
                        let organization_id = owning_organization(conn, updated.opportunity_id).await?;
                        conversation::ensure_conversation(
                            conn,
                            organization_id,
                            updated.volunteer_id,
                            updated.opportunity_id,
                        )
                        .await?;
                    }

                    Ok(updated)
                })
            })
            .await?;

        info!(application_id = %application_id, status = %status, "Application status changed");
        Ok(application)
    }

    /// Record attendance, rating and hours for an application.
    ///
    /// Marking a volunteer present completes the application, credits the
    /// opportunity's points and the logged hours, and sends one summary
    /// notification, all in one transaction. Points and hours are only
    /// credited the first time attendance becomes `present`, and a credited
    /// `present` can no longer be changed to `absent` or `pending`.
    pub async fn record_volunteer_performance(
        &self,
        application_id: Uuid,
        report: PerformanceReport,
    ) -> AppResult<Application> {
        report.validate()?;
        if report.hours_logged_by_org.is_some_and(|h| !h.is_finite()) {
            return Err(AppError::validation("Logged hours must be a finite number"));
        }

        let (application, credit) = self
            .db
            .with_transaction("record_volunteer_performance", move |conn| {
                Box::pin(async move {
                    let current = require_application(conn, application_id).await?;

                    if !current.status.accepts_attendance() {
                        return Err(AppError::validation(format!(
                            "Cannot record performance on a {} application",
                            current.status
                        )));
                    }

                    if !current.attendance.can_change_to(report.attendance) {
                        return Err(AppError::validation(format!(
                            "Application {application_id} was already credited as present; \
                             attendance cannot change to '{}'",
                            report.attendance
                        )));
                    }

                    let status = report.attendance.implied_status().unwrap_or(current.status);

                    let updated = sqlx::query_as::<_, Application>(
                        "UPDATE applications SET attendance = $2, status = $3, \
                         org_rating = COALESCE($4, org_rating), \
                         hours_logged_by_org = COALESCE($5, hours_logged_by_org), \
                         updated_at = NOW() \
                         WHERE id = $1 RETURNING *",
                    )
                    .bind(application_id)
                    .bind(report.attendance)
                    .bind(status)
                    .bind(report.org_rating)
                    .bind(report.hours_logged_by_org)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(|e| AppError::from_sqlx("Failed to record performance", e))?;

                    let first_attendance =
                        report.attendance == Attendance::Present && current.attendance != Attendance::Present;
                    if !first_attendance {
                        return Ok((updated, Credit::default()));
                    }

                    let credit = credit_attendance(conn, &updated, report.hours_logged_by_org).await?;
                    Ok((updated, credit))
                })
            })
            .await?;

        info!(
            application_id = %application_id,
            attendance = %application.attendance,
            status = %application.status,
            points = credit.points,
            hours = credit.hours,
            "Volunteer performance recorded"
        );
        Ok(application)
    }

    /// Find an application by primary key.
    pub async fn get_application_by_id(&self, id: Uuid) -> AppResult<Option<Application>> {
        let mut conn = self.db.acquire().await?;
        load_application(&mut conn, id).await
    }

    /// Applications to any opportunity owned by the organization, newest
    /// first.
    pub async fn get_applications_for_organization(&self, organization_id: Uuid) -> AppResult<Vec<Application>> {
        let mut conn = self.db.acquire().await?;

        let opportunity_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM opportunities WHERE organization_id = $1")
                .bind(organization_id)
                .fetch_all(&mut *conn)
                .await
                .map_err(|e| AppError::from_sqlx("Failed to list organization opportunities", e))?;

        if opportunity_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE opportunity_id = ANY($1) \
             ORDER BY submitted_at DESC, id",
        )
        .bind(&opportunity_ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list organization applications", e))
    }

    /// Applications submitted by a volunteer, newest first.
    pub async fn get_applications_for_volunteer(&self, volunteer_id: Uuid) -> AppResult<Vec<Application>> {
        sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE volunteer_id = $1 ORDER BY submitted_at DESC, id",
        )
        .bind(volunteer_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list volunteer applications", e))
    }
}

/// Credit points and hours for a first `present` attendance and send the
/// summary notification.
async fn credit_attendance(
    conn: &mut PgConnection,
    application: &Application,
    hours: Option<f64>,
) -> AppResult<Credit> {
    let points_awarded: i32 =
        sqlx::query_scalar("SELECT points_awarded FROM opportunities WHERE id = $1")
            .bind(application.opportunity_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to look up opportunity points", e))?
            .unwrap_or(0);

    let reason = format!("Attended \"{}\"", application.opportunity_title);
    let mut credit = Credit::default();

    if points_awarded > 0 {
        credit.points = i64::from(points_awarded);
        stats::increment_points(conn, application.volunteer_id, credit.points, &reason).await?;
    }
    if let Some(hours) = hours.filter(|h| *h > 0.0) {
        credit.hours = hours;
        stats::increment_hours(conn, application.volunteer_id, hours, &reason).await?;
    }

    notification::insert(
        &mut *conn,
        application.volunteer_id,
        &text::attendance_credited(&application.opportunity_title, credit.points, hours),
        Some(&text::profile_link()),
    )
    .await?;

    Ok(credit)
}

async fn owning_organization(conn: &mut PgConnection, opportunity_id: Uuid) -> AppResult<Uuid> {
    sqlx::query_scalar("SELECT organization_id FROM opportunities WHERE id = $1")
        .bind(opportunity_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to look up opportunity owner", e))?
        .ok_or_else(|| AppError::not_found(format!("Opportunity {opportunity_id} not found")))
}

async fn load_application(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Application>> {
    sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to find application", e))
}

async fn require_application(conn: &mut PgConnection, id: Uuid) -> AppResult<Application> {
    load_application(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Application {id} not found")))
}

//! Full-replace writes for multi-valued attributes stored in child tables.

use sqlx::PgConnection;
use uuid::Uuid;

use volunhub_core::error::AppError;
use volunhub_core::result::AppResult;
use volunhub_entity::user::model::normalize_values;

/// A child table holding one row per (owner, value).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValueTable {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub value_column: &'static str,
}

pub(crate) const USER_SKILLS: ValueTable = ValueTable {
    table: "user_skills",
    owner_column: "user_id",
    value_column: "skill",
};

pub(crate) const USER_CAUSES: ValueTable = ValueTable {
    table: "user_causes",
    owner_column: "user_id",
    value_column: "cause",
};

pub(crate) const OPPORTUNITY_SKILLS: ValueTable = ValueTable {
    table: "opportunity_skills",
    owner_column: "opportunity_id",
    value_column: "skill",
};

impl ValueTable {
    fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {} = $1", self.table, self.owner_column)
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}, {}) SELECT $1, v FROM UNNEST($2::text[]) AS v",
            self.table, self.owner_column, self.value_column
        )
    }
}

/// Insert values for a freshly created owner.
pub(crate) async fn insert_values(
    conn: &mut PgConnection,
    target: ValueTable,
    owner: Uuid,
    values: &[String],
) -> AppResult<()> {
    let values = normalize_values(values);
    if values.is_empty() {
        return Ok(());
    }
    sqlx::query(&target.insert_sql())
        .bind(owner)
        .bind(&values)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx(format!("Failed to insert {}", target.table), e))?;
    Ok(())
}

/// Delete every value of `owner` and insert `values` in its place.
///
/// Must run inside the caller's transaction so readers never observe the
/// intermediate empty set after commit.
pub(crate) async fn replace_values(
    conn: &mut PgConnection,
    target: ValueTable,
    owner: Uuid,
    values: &[String],
) -> AppResult<()> {
    sqlx::query(&target.delete_sql())
        .bind(owner)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx(format!("Failed to clear {}", target.table), e))?;
    insert_values(conn, target, owner, values).await
}

/// Delete every value of `owner`.
pub(crate) async fn delete_values(
    conn: &mut PgConnection,
    target: ValueTable,
    owner: Uuid,
) -> AppResult<u64> {
    let result = sqlx::query(&target.delete_sql())
        .bind(owner)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx(format!("Failed to clear {}", target.table), e))?;
    Ok(result.rows_affected())
}

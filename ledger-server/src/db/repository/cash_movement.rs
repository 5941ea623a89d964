//! Cash Movement Repository (收银流水)

use super::RepoResult;
use serde::Deserialize;
use shared::models::{CashDirection, CashMethod, CashMovement};
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str =
    "id, branch_id, date, method, direction, amount, description, created_at, updated_at";

/// Mutable columns, used both by updates and by update-undo
#[derive(Debug, Clone, Deserialize)]
pub struct CashMovementFields {
    pub branch_id: i64,
    pub date: String,
    pub method: CashMethod,
    pub direction: CashDirection,
    pub amount: f64,
    pub description: String,
}

pub async fn insert<'e>(
    exec: impl SqliteExecutor<'e>,
    fields: &CashMovementFields,
    now: i64,
) -> RepoResult<CashMovement> {
    let sql = format!(
        "INSERT INTO cash_movement \
         (branch_id, date, method, direction, amount, description, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING {COLUMNS}"
    );
    let movement = sqlx::query_as::<_, CashMovement>(&sql)
        .bind(fields.branch_id)
        .bind(&fields.date)
        .bind(fields.method)
        .bind(fields.direction)
        .bind(fields.amount)
        .bind(&fields.description)
        .bind(now)
        .fetch_one(exec)
        .await?;
    Ok(movement)
}

pub async fn find_by_id<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<CashMovement>> {
    let sql = format!("SELECT {COLUMNS} FROM cash_movement WHERE id = ?");
    let movement = sqlx::query_as::<_, CashMovement>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(movement)
}

pub async fn update<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
    fields: &CashMovementFields,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE cash_movement \
         SET branch_id = ?1, date = ?2, method = ?3, direction = ?4, amount = ?5, \
         description = ?6, updated_at = ?7 WHERE id = ?8",
    )
    .bind(fields.branch_id)
    .bind(&fields.date)
    .bind(fields.method)
    .bind(fields.direction)
    .bind(fields.amount)
    .bind(&fields.description)
    .bind(now)
    .bind(id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete<'e>(exec: impl SqliteExecutor<'e>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM cash_movement WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn recreate<'e>(
    exec: impl SqliteExecutor<'e>,
    snapshot: &CashMovement,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO cash_movement \
         (branch_id, date, method, direction, amount, description, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
    )
    .bind(snapshot.branch_id)
    .bind(&snapshot.date)
    .bind(snapshot.method)
    .bind(snapshot.direction)
    .bind(snapshot.amount)
    .bind(&snapshot.description)
    .bind(snapshot.created_at)
    .bind(now)
    .fetch_one(exec)
    .await?;
    Ok(id)
}

/// Sum of a branch's movements in one direction dated within [first, last]
pub async fn total_between(
    conn: &mut SqliteConnection,
    branch_id: i64,
    direction: CashDirection,
    first: &str,
    last: &str,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM cash_movement \
         WHERE branch_id = ?1 AND direction = ?2 AND date BETWEEN ?3 AND ?4",
    )
    .bind(branch_id)
    .bind(direction)
    .bind(first)
    .bind(last)
    .fetch_one(&mut *conn)
    .await?;
    Ok(total)
}

pub async fn delete_between(
    conn: &mut SqliteConnection,
    branch_id: i64,
    first: &str,
    last: &str,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "DELETE FROM cash_movement WHERE branch_id = ?1 AND date BETWEEN ?2 AND ?3",
    )
        .bind(branch_id)
        .bind(first)
        .bind(last)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected())
}

//! Expense Repository (支出)

use super::RepoResult;
use serde::Deserialize;
use shared::models::Expense;
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str =
    "id, branch_id, category_id, date, amount, description, created_at, updated_at";

/// Mutable columns, used both by updates and by update-undo
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseFields {
    pub branch_id: i64,
    pub category_id: i64,
    pub date: String,
    pub amount: f64,
    pub description: String,
}

pub async fn insert<'e>(
    exec: impl SqliteExecutor<'e>,
    fields: &ExpenseFields,
    now: i64,
) -> RepoResult<Expense> {
    let sql = format!(
        "INSERT INTO expense \
         (branch_id, category_id, date, amount, description, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING {COLUMNS}"
    );
    let expense = sqlx::query_as::<_, Expense>(&sql)
        .bind(fields.branch_id)
        .bind(fields.category_id)
        .bind(&fields.date)
        .bind(fields.amount)
        .bind(&fields.description)
        .bind(now)
        .fetch_one(exec)
        .await?;
    Ok(expense)
}

pub async fn find_by_id<'e>(exec: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Expense>> {
    let sql = format!("SELECT {COLUMNS} FROM expense WHERE id = ?");
    let expense = sqlx::query_as::<_, Expense>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(expense)
}

/// Overwrite the mutable columns. Returns false when the row is gone
pub async fn update<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
    fields: &ExpenseFields,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE expense SET branch_id = ?1, category_id = ?2, date = ?3, amount = ?4, \
         description = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(fields.branch_id)
    .bind(fields.category_id)
    .bind(&fields.date)
    .bind(fields.amount)
    .bind(&fields.description)
    .bind(now)
    .bind(id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete<'e>(exec: impl SqliteExecutor<'e>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM expense WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn recreate<'e>(
    exec: impl SqliteExecutor<'e>,
    snapshot: &Expense,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO expense \
         (branch_id, category_id, date, amount, description, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
    )
    .bind(snapshot.branch_id)
    .bind(snapshot.category_id)
    .bind(&snapshot.date)
    .bind(snapshot.amount)
    .bind(&snapshot.description)
    .bind(snapshot.created_at)
    .bind(now)
    .fetch_one(exec)
    .await?;
    Ok(id)
}

pub async fn total_between(
    conn: &mut SqliteConnection,
    branch_id: i64,
    first: &str,
    last: &str,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM expense \
         WHERE branch_id = ?1 AND date BETWEEN ?2 AND ?3",
    )
    .bind(branch_id)
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
    let rows = sqlx::query("DELETE FROM expense WHERE branch_id = ?1 AND date BETWEEN ?2 AND ?3")
        .bind(branch_id)
        .bind(first)
        .bind(last)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected())
}

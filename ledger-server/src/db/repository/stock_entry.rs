//! Stock Entry Repository (盘点)

use super::RepoResult;
use serde::Deserialize;
use shared::models::StockEntry;
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str =
    "id, branch_id, product_id, count_date, quantity, note, created_at, updated_at";

/// Counted figures, used both by updates and by update-undo
#[derive(Debug, Clone, Deserialize)]
pub struct StockEntryFields {
    pub branch_id: i64,
    pub product_id: i64,
    pub count_date: String,
    pub quantity: f64,
}

pub async fn insert(
    conn: &mut SqliteConnection,
    branch_id: i64,
    product_id: i64,
    count_date: &str,
    quantity: f64,
    note: Option<&str>,
    now: i64,
) -> RepoResult<StockEntry> {
    let sql = format!(
        "INSERT INTO stock_entry \
         (branch_id, product_id, count_date, quantity, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING {COLUMNS}"
    );
    let entry = sqlx::query_as::<_, StockEntry>(&sql)
        .bind(branch_id)
        .bind(product_id)
        .bind(count_date)
        .bind(quantity)
        .bind(note)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
    Ok(entry)
}

pub async fn find_by_id<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<StockEntry>> {
    let sql = format!("SELECT {COLUMNS} FROM stock_entry WHERE id = ?");
    let entry = sqlx::query_as::<_, StockEntry>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(entry)
}

/// Counts of one (branch, product) pair in creation order
pub async fn find_for_pair<'e>(
    exec: impl SqliteExecutor<'e>,
    branch_id: i64,
    product_id: i64,
) -> RepoResult<Vec<StockEntry>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM stock_entry WHERE branch_id = ? AND product_id = ? \
         ORDER BY created_at, id"
    );
    let entries = sqlx::query_as::<_, StockEntry>(&sql)
        .bind(branch_id)
        .bind(product_id)
        .fetch_all(exec)
        .await?;
    Ok(entries)
}

/// All counts of a branch in creation order
pub async fn find_for_branch<'e>(
    exec: impl SqliteExecutor<'e>,
    branch_id: i64,
) -> RepoResult<Vec<StockEntry>> {
    let sql =
        format!("SELECT {COLUMNS} FROM stock_entry WHERE branch_id = ? ORDER BY created_at, id");
    let entries = sqlx::query_as::<_, StockEntry>(&sql)
        .bind(branch_id)
        .fetch_all(exec)
        .await?;
    Ok(entries)
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM stock_entry WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &StockEntryFields,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE stock_entry SET branch_id = ?1, product_id = ?2, count_date = ?3, \
         quantity = ?4, updated_at = ?5 WHERE id = ?6",
    )
    .bind(fields.branch_id)
    .bind(fields.product_id)
    .bind(&fields.count_date)
    .bind(fields.quantity)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Insert a snapshot as a new row; keeps `created_at`, assigns a new id
pub async fn recreate(
    conn: &mut SqliteConnection,
    snapshot: &StockEntry,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stock_entry \
         (branch_id, product_id, count_date, quantity, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
    )
    .bind(snapshot.branch_id)
    .bind(snapshot.product_id)
    .bind(&snapshot.count_date)
    .bind(snapshot.quantity)
    .bind(&snapshot.note)
    .bind(snapshot.created_at)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Remove a branch's counts dated within [first, last]
pub async fn delete_between(
    conn: &mut SqliteConnection,
    branch_id: i64,
    first: &str,
    last: &str,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "DELETE FROM stock_entry WHERE branch_id = ?1 AND count_date BETWEEN ?2 AND ?3",
    )
    .bind(branch_id)
    .bind(first)
    .bind(last)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected())
}

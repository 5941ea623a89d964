//! Waste Entry Repository (报损)

use super::RepoResult;
use serde::Deserialize;
use shared::models::WasteEntry;
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str = "id, branch_id, product_id, date, quantity, note, created_at, updated_at";

/// Fields an update-undo restores
#[derive(Debug, Clone, Deserialize)]
pub struct WasteEntryRestore {
    pub branch_id: i64,
    pub product_id: i64,
    pub date: String,
    pub quantity: f64,
    pub note: String,
}

pub async fn insert(
    conn: &mut SqliteConnection,
    branch_id: i64,
    product_id: i64,
    date: &str,
    quantity: f64,
    note: &str,
    now: i64,
) -> RepoResult<WasteEntry> {
    let sql = format!(
        "INSERT INTO waste_entry \
         (branch_id, product_id, date, quantity, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING {COLUMNS}"
    );
    let entry = sqlx::query_as::<_, WasteEntry>(&sql)
        .bind(branch_id)
        .bind(product_id)
        .bind(date)
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
) -> RepoResult<Option<WasteEntry>> {
    let sql = format!("SELECT {COLUMNS} FROM waste_entry WHERE id = ?");
    let entry = sqlx::query_as::<_, WasteEntry>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(entry)
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM waste_entry WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn restore(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &WasteEntryRestore,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE waste_entry \
         SET branch_id = ?1, product_id = ?2, date = ?3, quantity = ?4, note = ?5, \
         updated_at = ?6 WHERE id = ?7",
    )
    .bind(fields.branch_id)
    .bind(fields.product_id)
    .bind(&fields.date)
    .bind(fields.quantity)
    .bind(&fields.note)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn recreate(
    conn: &mut SqliteConnection,
    snapshot: &WasteEntry,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO waste_entry \
         (branch_id, product_id, date, quantity, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
    )
    .bind(snapshot.branch_id)
    .bind(snapshot.product_id)
    .bind(&snapshot.date)
    .bind(snapshot.quantity)
    .bind(&snapshot.note)
    .bind(snapshot.created_at)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn delete_between(
    conn: &mut SqliteConnection,
    branch_id: i64,
    first: &str,
    last: &str,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "DELETE FROM waste_entry WHERE branch_id = ?1 AND date BETWEEN ?2 AND ?3",
    )
        .bind(branch_id)
        .bind(first)
        .bind(last)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected())
}

//! Stock Snapshot Repository (月初/月末快照)

use super::RepoResult;
use serde::Deserialize;
use shared::models::{SnapshotType, StockSnapshot};
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str =
    "id, branch_id, product_id, snapshot_date, snapshot_type, quantity, created_at, updated_at";

/// Restorable snapshot fields
#[derive(Debug, Clone, Deserialize)]
pub struct StockSnapshotFields {
    pub branch_id: i64,
    pub product_id: i64,
    pub snapshot_date: String,
    #[serde(rename = "type")]
    pub snapshot_type: SnapshotType,
    pub quantity: f64,
}

pub async fn insert(
    conn: &mut SqliteConnection,
    fields: &StockSnapshotFields,
    now: i64,
) -> RepoResult<StockSnapshot> {
    let sql = format!(
        "INSERT INTO stock_snapshot \
         (branch_id, product_id, snapshot_date, snapshot_type, quantity, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING {COLUMNS}"
    );
    let snapshot = sqlx::query_as::<_, StockSnapshot>(&sql)
        .bind(fields.branch_id)
        .bind(fields.product_id)
        .bind(&fields.snapshot_date)
        .bind(fields.snapshot_type)
        .bind(fields.quantity)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
    Ok(snapshot)
}

pub async fn find_by_id<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<StockSnapshot>> {
    let sql = format!("SELECT {COLUMNS} FROM stock_snapshot WHERE id = ?");
    let snapshot = sqlx::query_as::<_, StockSnapshot>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(snapshot)
}

/// Snapshots of a branch, newest date first
pub async fn find_for_branch<'e>(
    exec: impl SqliteExecutor<'e>,
    branch_id: i64,
) -> RepoResult<Vec<StockSnapshot>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM stock_snapshot WHERE branch_id = ? \
         ORDER BY snapshot_date DESC, created_at DESC, id DESC"
    );
    let snapshots = sqlx::query_as::<_, StockSnapshot>(&sql)
        .bind(branch_id)
        .fetch_all(exec)
        .await?;
    Ok(snapshots)
}

/// Start-of-month snapshots dated `first` and end-of-month snapshots dated
/// `last`, in creation order
pub async fn find_month_bounds<'e>(
    exec: impl SqliteExecutor<'e>,
    branch_id: i64,
    first: &str,
    last: &str,
) -> RepoResult<Vec<StockSnapshot>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM stock_snapshot WHERE branch_id = ?1 \
         AND ((snapshot_type = 'start_of_month' AND snapshot_date = ?2) \
           OR (snapshot_type = 'end_of_month' AND snapshot_date = ?3)) \
         ORDER BY created_at, id"
    );
    let snapshots = sqlx::query_as::<_, StockSnapshot>(&sql)
        .bind(branch_id)
        .bind(first)
        .bind(last)
        .fetch_all(exec)
        .await?;
    Ok(snapshots)
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM stock_snapshot WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn restore(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &StockSnapshotFields,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE stock_snapshot SET branch_id = ?1, product_id = ?2, snapshot_date = ?3, \
         snapshot_type = ?4, quantity = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(fields.branch_id)
    .bind(fields.product_id)
    .bind(&fields.snapshot_date)
    .bind(fields.snapshot_type)
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
    snapshot: &StockSnapshot,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stock_snapshot \
         (branch_id, product_id, snapshot_date, snapshot_type, quantity, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
    )
    .bind(snapshot.branch_id)
    .bind(snapshot.product_id)
    .bind(&snapshot.snapshot_date)
    .bind(snapshot.snapshot_type)
    .bind(snapshot.quantity)
    .bind(snapshot.created_at)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

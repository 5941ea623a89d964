//! Center Shipment Repository (中央配送)

use super::RepoResult;
use serde::Deserialize;
use shared::models::CenterShipment;
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str = "id, branch_id, product_id, date, quantity, unit_price, total_price, note, \
                       created_at, updated_at";

/// Fields an update-undo restores
#[derive(Debug, Clone, Deserialize)]
pub struct CenterShipmentRestore {
    pub branch_id: i64,
    pub product_id: i64,
    pub date: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub note: Option<String>,
}

/// New row values (already validated, total computed)
#[derive(Debug, Clone)]
pub struct CenterShipmentRow<'a> {
    pub branch_id: i64,
    pub product_id: i64,
    pub date: &'a str,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub note: Option<&'a str>,
}

pub async fn insert(
    conn: &mut SqliteConnection,
    row: &CenterShipmentRow<'_>,
    now: i64,
) -> RepoResult<CenterShipment> {
    let sql = format!(
        "INSERT INTO center_shipment (branch_id, product_id, date, quantity, unit_price, \
         total_price, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) RETURNING {COLUMNS}"
    );
    let shipment = sqlx::query_as::<_, CenterShipment>(&sql)
        .bind(row.branch_id)
        .bind(row.product_id)
        .bind(row.date)
        .bind(row.quantity)
        .bind(row.unit_price)
        .bind(row.total_price)
        .bind(row.note)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
    Ok(shipment)
}

pub async fn find_by_id<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<CenterShipment>> {
    let sql = format!("SELECT {COLUMNS} FROM center_shipment WHERE id = ?");
    let shipment = sqlx::query_as::<_, CenterShipment>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(shipment)
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM center_shipment WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn restore(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &CenterShipmentRestore,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE center_shipment SET branch_id = ?1, product_id = ?2, date = ?3, quantity = ?4, \
         unit_price = ?5, total_price = ?6, note = ?7, updated_at = ?8 WHERE id = ?9",
    )
    .bind(fields.branch_id)
    .bind(fields.product_id)
    .bind(&fields.date)
    .bind(fields.quantity)
    .bind(fields.unit_price)
    .bind(fields.total_price)
    .bind(&fields.note)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Insert a snapshot as a new row; keeps `created_at` (its booking time)
pub async fn recreate(
    conn: &mut SqliteConnection,
    snapshot: &CenterShipment,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO center_shipment (branch_id, product_id, date, quantity, unit_price, \
         total_price, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING id",
    )
    .bind(snapshot.branch_id)
    .bind(snapshot.product_id)
    .bind(&snapshot.date)
    .bind(snapshot.quantity)
    .bind(snapshot.unit_price)
    .bind(snapshot.total_price)
    .bind(&snapshot.note)
    .bind(snapshot.created_at)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Cost of a branch's center shipments dated within [first, last]
pub async fn total_between(
    conn: &mut SqliteConnection,
    branch_id: i64,
    first: &str,
    last: &str,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_price), 0.0) FROM center_shipment \
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
    let rows = sqlx::query(
        "DELETE FROM center_shipment WHERE branch_id = ?1 AND date BETWEEN ?2 AND ?3",
    )
    .bind(branch_id)
    .bind(first)
    .bind(last)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected())
}

//! Shipment Repository (到货单 + 明细)

use super::{RepoError, RepoResult};
use serde::Deserialize;
use shared::models::{Shipment, ShipmentItem};
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str =
    "id, branch_id, date, total_amount, is_stocked, booked_at, note, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, shipment_id, product_id, quantity, unit_price, total_price";

/// Fields an update-undo restores
#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentRestore {
    pub branch_id: i64,
    pub date: String,
    pub note: Option<String>,
    pub is_stocked: bool,
    pub booked_at: Option<i64>,
}

/// Validated item line with its computed total
#[derive(Debug, Clone, Copy)]
pub struct ShipmentItemRow {
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Insert a pending shipment and its items
pub async fn insert(
    conn: &mut SqliteConnection,
    branch_id: i64,
    date: &str,
    note: Option<&str>,
    total_amount: f64,
    items: &[ShipmentItemRow],
    now: i64,
) -> RepoResult<Shipment> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO shipment \
         (branch_id, date, total_amount, is_stocked, booked_at, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, 0, NULL, ?4, ?5, ?5) RETURNING id",
    )
    .bind(branch_id)
    .bind(date)
    .bind(total_amount)
    .bind(note)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO shipment_item \
             (shipment_id, product_id, quantity, unit_price, total_price) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total_price)
        .execute(&mut *conn)
        .await?;
    }

    find_with_items(conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create shipment".into()))
}

pub async fn find_by_id<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<Shipment>> {
    let sql = format!("SELECT {COLUMNS} FROM shipment WHERE id = ?");
    let shipment = sqlx::query_as::<_, Shipment>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(shipment)
}

pub async fn find_items<'e>(
    exec: impl SqliteExecutor<'e>,
    shipment_id: i64,
) -> RepoResult<Vec<ShipmentItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM shipment_item WHERE shipment_id = ? ORDER BY id");
    let items = sqlx::query_as::<_, ShipmentItem>(&sql)
        .bind(shipment_id)
        .fetch_all(exec)
        .await?;
    Ok(items)
}

/// Shipment with its items populated
pub async fn find_with_items(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Shipment>> {
    let Some(mut shipment) = find_by_id(&mut *conn, id).await? else {
        return Ok(None);
    };
    shipment.items = find_items(&mut *conn, id).await?;
    Ok(Some(shipment))
}

/// Pending → booked. Returns false if the shipment is missing or already booked
pub async fn mark_booked(conn: &mut SqliteConnection, id: i64, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE shipment SET is_stocked = 1, booked_at = ?1, updated_at = ?1 \
         WHERE id = ?2 AND is_stocked = 0",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Delete a shipment; its items go with it (ON DELETE CASCADE)
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM shipment WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn restore(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &ShipmentRestore,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE shipment \
         SET branch_id = ?1, date = ?2, note = ?3, is_stocked = ?4, booked_at = ?5, \
         updated_at = ?6 WHERE id = ?7",
    )
    .bind(fields.branch_id)
    .bind(&fields.date)
    .bind(&fields.note)
    .bind(fields.is_stocked)
    .bind(fields.booked_at)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Insert the header of a snapshot as a new shipment
///
/// Item lines are not restored: the new shipment has no items.
pub async fn recreate(
    conn: &mut SqliteConnection,
    snapshot: &Shipment,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO shipment \
         (branch_id, date, total_amount, is_stocked, booked_at, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
    )
    .bind(snapshot.branch_id)
    .bind(&snapshot.date)
    .bind(snapshot.total_amount)
    .bind(snapshot.is_stocked)
    .bind(snapshot.booked_at)
    .bind(&snapshot.note)
    .bind(snapshot.created_at)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Cost of a branch's booked shipments dated within [first, last]
pub async fn booked_total_between(
    conn: &mut SqliteConnection,
    branch_id: i64,
    first: &str,
    last: &str,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_amount), 0.0) FROM shipment \
         WHERE branch_id = ?1 AND is_stocked = 1 AND date BETWEEN ?2 AND ?3",
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
    let rows = sqlx::query("DELETE FROM shipment WHERE branch_id = ?1 AND date BETWEEN ?2 AND ?3")
        .bind(branch_id)
        .bind(first)
        .bind(last)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected())
}

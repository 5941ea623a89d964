//! Inbound Movement Reader
//!
//! Unifies center shipments (booked when recorded) and shipment items
//! (booked when their shipment is stocked) into one row shape. Each row
//! carries whether the creation audit record of its origin was undone.

use super::RepoResult;
use sqlx::SqliteExecutor;

/// One inbound line as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InboundMovementRow {
    /// `center_shipment` or `shipment`
    pub origin: String,
    pub origin_id: i64,
    pub product_id: i64,
    pub quantity: f64,
    pub cost: f64,
    pub event_date: String,
    /// NULL while the origin is pending
    pub booked_at: Option<i64>,
    pub reversed: bool,
}

const MOVEMENTS_SQL: &str = "\
    SELECT 'center_shipment' AS origin, cs.id AS origin_id, cs.product_id AS product_id, \
           cs.quantity AS quantity, cs.total_price AS cost, cs.date AS event_date, \
           cs.created_at AS booked_at, \
           EXISTS (SELECT 1 FROM audit_log a \
                   WHERE a.entity_type = 'center_shipment' AND a.entity_id = cs.id \
                   AND a.action = 'create' AND a.is_undone = 1) AS reversed \
    FROM center_shipment cs \
    WHERE cs.branch_id = ?1 AND (?2 IS NULL OR cs.product_id = ?2) \
    UNION ALL \
    SELECT 'shipment', s.id, si.product_id, si.quantity, si.total_price, s.date, \
           CASE WHEN s.is_stocked = 1 THEN s.booked_at END, \
           EXISTS (SELECT 1 FROM audit_log a \
                   WHERE a.entity_type = 'shipment' AND a.entity_id = s.id \
                   AND a.action = 'create' AND a.is_undone = 1) \
    FROM shipment_item si JOIN shipment s ON s.id = si.shipment_id \
    WHERE s.branch_id = ?1 AND (?2 IS NULL OR si.product_id = ?2) \
    ORDER BY origin, origin_id";

/// Movements of one (branch, product) pair
pub async fn find_for_pair<'e>(
    exec: impl SqliteExecutor<'e>,
    branch_id: i64,
    product_id: i64,
) -> RepoResult<Vec<InboundMovementRow>> {
    let rows = sqlx::query_as::<_, InboundMovementRow>(MOVEMENTS_SQL)
        .bind(branch_id)
        .bind(Some(product_id))
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

/// Movements of every product of a branch
pub async fn find_for_branch<'e>(
    exec: impl SqliteExecutor<'e>,
    branch_id: i64,
) -> RepoResult<Vec<InboundMovementRow>> {
    let rows = sqlx::query_as::<_, InboundMovementRow>(MOVEMENTS_SQL)
        .bind(branch_id)
        .bind(None::<i64>)
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

//! Monthly Report Repository (月结)

use super::RepoResult;
use shared::models::MonthlyReport;
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str = "id, branch_id, year, month, total_revenue, total_expenses, total_shipments, \
                       net_profit, closed_by_id, closed_by_name, created_at";

/// Totals of a month being closed
#[derive(Debug, Clone, Default)]
pub struct MonthTotals {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_shipments: f64,
    pub net_profit: f64,
}

pub async fn find<'e>(
    exec: impl SqliteExecutor<'e>,
    branch_id: i64,
    year: i32,
    month: i32,
) -> RepoResult<Option<MonthlyReport>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM monthly_report WHERE branch_id = ? AND year = ? AND month = ?"
    );
    let report = sqlx::query_as::<_, MonthlyReport>(&sql)
        .bind(branch_id)
        .bind(year)
        .bind(month)
        .fetch_optional(exec)
        .await?;
    Ok(report)
}

/// Reports of a branch, newest month first
pub async fn find_for_branch<'e>(
    exec: impl SqliteExecutor<'e>,
    branch_id: i64,
) -> RepoResult<Vec<MonthlyReport>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM monthly_report WHERE branch_id = ? ORDER BY year DESC, month DESC"
    );
    let reports = sqlx::query_as::<_, MonthlyReport>(&sql)
        .bind(branch_id)
        .fetch_all(exec)
        .await?;
    Ok(reports)
}

/// Claim the (branch, year, month) slot with zero totals
///
/// A second close of the same month fails here with a unique violation.
pub async fn insert_pending(
    conn: &mut SqliteConnection,
    branch_id: i64,
    year: i32,
    month: i32,
    closed_by_id: i64,
    closed_by_name: &str,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO monthly_report \
         (branch_id, year, month, closed_by_id, closed_by_name, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
    )
    .bind(branch_id)
    .bind(year)
    .bind(month)
    .bind(closed_by_id)
    .bind(closed_by_name)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn set_totals(
    conn: &mut SqliteConnection,
    id: i64,
    totals: &MonthTotals,
) -> RepoResult<MonthlyReport> {
    let sql = format!(
        "UPDATE monthly_report \
         SET total_revenue = ?1, total_expenses = ?2, total_shipments = ?3, net_profit = ?4 \
         WHERE id = ?5 RETURNING {COLUMNS}"
    );
    let report = sqlx::query_as::<_, MonthlyReport>(&sql)
        .bind(totals.total_revenue)
        .bind(totals.total_expenses)
        .bind(totals.total_shipments)
        .bind(totals.net_profit)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(report)
}

//! 月结 (Period close)
//!
//! 单个事务内：
//! 1. 先插入零值报表占位 (唯一约束拒绝重复月结)
//! 2. 汇总当月收入、支出、进货成本并写回报表
//! 3. 删除当月的收银流水、支出、到货单、中央配送、盘点和报损
//!
//! 审计记录保留，派生引擎对已删除的历史视为不存在。

use shared::error::ErrorCode;
use shared::models::{CashDirection, MonthlyReport};
use sqlx::SqlitePool;

use crate::auth::Actor;
use crate::db::lookup::require_branch;
use crate::db::repository::monthly_report::{self, MonthTotals};
use crate::db::repository::{
    RepoError, cash_movement, center_shipment, expense, shipment, stock_entry, waste_entry,
};
use crate::inventory::quantity::{money_to_f64, to_decimal};
use crate::utils::time::month_bounds;
use crate::utils::{LedgerError, LedgerResult};

pub async fn close_month(
    pool: &SqlitePool,
    actor: &Actor,
    branch_id: Option<i64>,
    year: i32,
    month: u32,
    now: i64,
) -> LedgerResult<MonthlyReport> {
    let branch_id = actor.resolve_branch(branch_id)?;
    let (first_day, last_day, _) = month_bounds(year, month)?;
    require_branch(pool, branch_id).await?;
    let (first, last) = (first_day.to_string(), last_day.to_string());
    let month_no = month as i32;

    let mut tx = pool.begin().await?;
    let pending = monthly_report::insert_pending(
        &mut tx,
        branch_id,
        year,
        month_no,
        actor.id,
        &actor.name,
        now,
    )
    .await;
    let report_id = match pending {
        Ok(id) => id,
        Err(RepoError::Duplicate(_)) => {
            return Err(LedgerError::Conflict(
                ErrorCode::MonthlyReportExists,
                format!("Month {year}-{month:02} is already closed for branch {branch_id}"),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let cash_in =
        cash_movement::total_between(&mut tx, branch_id, CashDirection::In, &first, &last).await?;
    let cash_out =
        cash_movement::total_between(&mut tx, branch_id, CashDirection::Out, &first, &last).await?;
    let expenses = expense::total_between(&mut tx, branch_id, &first, &last).await?;
    let shipments = shipment::booked_total_between(&mut tx, branch_id, &first, &last).await?;
    let center = center_shipment::total_between(&mut tx, branch_id, &first, &last).await?;

    let revenue = to_decimal(cash_in);
    let total_expenses = to_decimal(expenses) + to_decimal(cash_out);
    let total_shipments = to_decimal(shipments) + to_decimal(center);
    let totals = MonthTotals {
        total_revenue: money_to_f64(revenue),
        total_expenses: money_to_f64(total_expenses),
        total_shipments: money_to_f64(total_shipments),
        net_profit: money_to_f64(revenue - total_expenses - total_shipments),
    };
    let report = monthly_report::set_totals(&mut tx, report_id, &totals).await?;

    let purged = [
        cash_movement::delete_between(&mut tx, branch_id, &first, &last).await?,
        expense::delete_between(&mut tx, branch_id, &first, &last).await?,
        shipment::delete_between(&mut tx, branch_id, &first, &last).await?,
        center_shipment::delete_between(&mut tx, branch_id, &first, &last).await?,
        stock_entry::delete_between(&mut tx, branch_id, &first, &last).await?,
        waste_entry::delete_between(&mut tx, branch_id, &first, &last).await?,
    ];
    tx.commit().await?;

    tracing::info!(
        branch_id,
        year,
        month,
        report_id = report.id,
        net_profit = report.net_profit,
        purged_rows = purged.iter().sum::<u64>(),
        actor_id = actor.id,
        "Month closed"
    );
    Ok(report)
}

/// 分店的月结报表，最新在前
pub async fn monthly_reports(
    pool: &SqlitePool,
    actor: &Actor,
    branch_id: Option<i64>,
) -> LedgerResult<Vec<MonthlyReport>> {
    let branch_id = actor.resolve_branch(branch_id)?;
    Ok(monthly_report::find_for_branch(pool, branch_id).await?)
}

//! 库存派生引擎 (存储层)
//!
//! 每次读取都重新加载盘点与入库记录，交给 [`derivation`](super::derivation)
//! 纯函数计算，不缓存任何结果。入库行自带 `reversed` 标记，
//! 由创建审计记录的 `is_undone` 在查询时得出。

use std::collections::HashMap;

use chrono_tz::Tz;
use shared::models::{
    CurrentStock, MonthlyStockReport, MonthlyStockRow, MonthlyUsage, Product, SnapshotType,
    StockEntry, StockSnapshot, UsageBetweenCounts,
};
use sqlx::SqlitePool;

use super::derivation::{self, InboundMovement, MonthWindow, MovementOrigin, StockCount};
use crate::db::lookup::{require_branch, require_product};
use crate::db::repository::inbound_movement::{self, InboundMovementRow};
use crate::db::repository::{product, stock_entry, stock_snapshot};
use crate::utils::time::{day_start_millis, month_bounds};
use crate::utils::{LedgerError, LedgerResult};

#[derive(Clone)]
pub struct StockDerivationEngine {
    pool: SqlitePool,
    tz: Tz,
}

impl StockDerivationEngine {
    pub fn new(pool: SqlitePool, tz: Tz) -> Self {
        Self { pool, tz }
    }

    /// 单个商品的当前库存
    pub async fn current_stock(
        &self,
        branch_id: i64,
        product_id: i64,
    ) -> LedgerResult<CurrentStock> {
        let (product, counts, movements) = self.load_pair(branch_id, product_id).await?;
        Ok(current_stock_of(&product, &counts, &movements))
    }

    /// 单个商品的月度用量
    pub async fn monthly_usage(
        &self,
        branch_id: i64,
        product_id: i64,
        year: i32,
        month: u32,
    ) -> LedgerResult<MonthlyUsage> {
        let window = self.month_window(year, month)?;
        let (product, counts, movements) = self.load_pair(branch_id, product_id).await?;
        Ok(monthly_usage_of(&product, &counts, &movements, year, month, &window))
    }

    /// 最近两次盘点之间的用量；盘点少于两次时为 None
    pub async fn usage_between_counts(
        &self,
        branch_id: i64,
        product_id: i64,
    ) -> LedgerResult<Option<UsageBetweenCounts>> {
        let (product, counts, movements) = self.load_pair(branch_id, product_id).await?;
        Ok(usage_between_counts_of(&product, &counts, &movements))
    }

    /// 分店所有商品的当前库存 (按商品名排序)
    pub async fn current_stock_for_branch(
        &self,
        branch_id: i64,
    ) -> LedgerResult<Vec<CurrentStock>> {
        let snapshot = self.load_branch(branch_id, ProductScope::All).await?;
        Ok(snapshot
            .products
            .iter()
            .map(|p| current_stock_of(p, snapshot.counts(p.id), snapshot.movements(p.id)))
            .collect())
    }

    /// 分店中央商品的月度用量
    pub async fn monthly_usage_for_branch(
        &self,
        branch_id: i64,
        year: i32,
        month: u32,
    ) -> LedgerResult<Vec<MonthlyUsage>> {
        let window = self.month_window(year, month)?;
        let snapshot = self.load_branch(branch_id, ProductScope::Center).await?;
        Ok(snapshot
            .products
            .iter()
            .map(|p| {
                let (counts, movements) = (snapshot.counts(p.id), snapshot.movements(p.id));
                monthly_usage_of(p, counts, movements, year, month, &window)
            })
            .collect())
    }

    /// 分店中央商品两次盘点间用量；盘点少于两次的商品被省略
    pub async fn usage_between_counts_for_branch(
        &self,
        branch_id: i64,
    ) -> LedgerResult<Vec<UsageBetweenCounts>> {
        let snapshot = self.load_branch(branch_id, ProductScope::Center).await?;
        Ok(snapshot
            .products
            .iter()
            .filter_map(|p| {
                usage_between_counts_of(p, snapshot.counts(p.id), snapshot.movements(p.id))
            })
            .collect())
    }

    /// 分店的月初/月末快照，日期新的在前
    pub async fn stock_snapshots(&self, branch_id: i64) -> LedgerResult<Vec<StockSnapshot>> {
        require_branch(&self.pool, branch_id).await?;
        Ok(stock_snapshot::find_for_branch(&self.pool, branch_id).await?)
    }

    /// 快照月报: 月初快照 (当月 1 日) + 当月入库 − 月末快照 (当月最后一天)
    ///
    /// 只列出有快照或当月入库的商品。
    pub async fn monthly_stock_report(
        &self,
        branch_id: i64,
        year: i32,
        month: u32,
    ) -> LedgerResult<MonthlyStockReport> {
        let window = self.month_window(year, month)?;
        require_branch(&self.pool, branch_id).await?;
        let first = window.first_day.to_string();
        let last = window.last_day.to_string();

        let mut conn = self.pool.acquire().await?;
        let products = product::find_all(&mut *conn).await?;
        // 同一天重复的快照以最后创建的为准
        let mut bounds: HashMap<i64, (Option<f64>, Option<f64>)> = HashMap::new();
        for snap in stock_snapshot::find_month_bounds(&mut *conn, branch_id, &first, &last).await? {
            let entry = bounds.entry(snap.product_id).or_default();
            match snap.snapshot_type {
                SnapshotType::StartOfMonth => entry.0 = Some(snap.quantity),
                SnapshotType::EndOfMonth => entry.1 = Some(snap.quantity),
            }
        }
        let movements = group_movements(
            inbound_movement::find_for_branch(&mut *conn, branch_id).await?,
        )?;
        drop(conn);

        let rows = products
            .iter()
            .filter_map(|p| {
                let (start, end) = bounds.get(&p.id).copied().unwrap_or_default();
                let product_movements = movements.get(&p.id).map_or(&[][..], Vec::as_slice);
                let figures = derivation::snapshot_usage(start, end, product_movements, &window)?;
                Some(MonthlyStockRow {
                    product_id: p.id,
                    product_name: p.name.clone(),
                    unit: p.unit.clone(),
                    start_qty: figures.start_qty,
                    end_qty: figures.end_qty,
                    incoming_qty: figures.incoming_qty,
                    used_qty: figures.used_qty,
                    incoming_cost: figures.incoming_cost,
                })
            })
            .collect();

        Ok(MonthlyStockReport { branch_id, year, month, rows })
    }

    fn month_window(&self, year: i32, month: u32) -> LedgerResult<MonthWindow> {
        let (first_day, last_day, next_first) = month_bounds(year, month)?;
        Ok(MonthWindow {
            first_day,
            last_day,
            end_millis: day_start_millis(next_first, self.tz),
        })
    }

    async fn load_pair(
        &self,
        branch_id: i64,
        product_id: i64,
    ) -> LedgerResult<(Product, Vec<StockCount>, Vec<InboundMovement>)> {
        require_branch(&self.pool, branch_id).await?;
        let product = require_product(&self.pool, product_id).await?;

        let mut conn = self.pool.acquire().await?;
        let counts = stock_entry::find_for_pair(&mut *conn, branch_id, product_id)
            .await?
            .iter()
            .map(to_count)
            .collect::<LedgerResult<Vec<_>>>()?;
        let movements = inbound_movement::find_for_pair(&mut *conn, branch_id, product_id)
            .await?
            .iter()
            .map(to_movement)
            .collect::<LedgerResult<Vec<_>>>()?;
        Ok((product, counts, movements))
    }

    async fn load_branch(
        &self,
        branch_id: i64,
        scope: ProductScope,
    ) -> LedgerResult<BranchSnapshot> {
        require_branch(&self.pool, branch_id).await?;

        let mut conn = self.pool.acquire().await?;
        let products = match scope {
            ProductScope::All => product::find_all(&mut *conn).await?,
            ProductScope::Center => product::find_center_products(&mut *conn).await?,
        };

        let mut counts: HashMap<i64, Vec<StockCount>> = HashMap::new();
        for entry in stock_entry::find_for_branch(&mut *conn, branch_id).await? {
            counts.entry(entry.product_id).or_default().push(to_count(&entry)?);
        }
        let movements = group_movements(
            inbound_movement::find_for_branch(&mut *conn, branch_id).await?,
        )?;

        tracing::debug!(
            branch_id,
            products = products.len(),
            counted_products = counts.len(),
            "Loaded branch stock history"
        );
        Ok(BranchSnapshot { products, counts, movements })
    }
}

/// 分店报表覆盖的商品范围
#[derive(Debug, Clone, Copy)]
enum ProductScope {
    All,
    /// 仅中央厨房供货的商品 (用量报表)
    Center,
}

fn group_movements(
    rows: Vec<InboundMovementRow>,
) -> LedgerResult<HashMap<i64, Vec<InboundMovement>>> {
    let mut movements: HashMap<i64, Vec<InboundMovement>> = HashMap::new();
    for row in &rows {
        movements.entry(row.product_id).or_default().push(to_movement(row)?);
    }
    Ok(movements)
}

/// 一个分店的盘点与入库，按商品分组
struct BranchSnapshot {
    products: Vec<Product>,
    counts: HashMap<i64, Vec<StockCount>>,
    movements: HashMap<i64, Vec<InboundMovement>>,
}

impl BranchSnapshot {
    fn counts(&self, product_id: i64) -> &[StockCount] {
        self.counts.get(&product_id).map_or(&[], Vec::as_slice)
    }

    fn movements(&self, product_id: i64) -> &[InboundMovement] {
        self.movements.get(&product_id).map_or(&[], Vec::as_slice)
    }
}

fn current_stock_of(
    product: &Product,
    counts: &[StockCount],
    movements: &[InboundMovement],
) -> CurrentStock {
    let level = derivation::current_stock(counts, movements);
    CurrentStock {
        product_id: product.id,
        product_name: product.name.clone(),
        unit: product.unit.clone(),
        quantity: level.quantity,
        last_count_date: level.base_count.map(|c| c.count_date.to_string()),
        incoming_since_count: level.incoming_since_count,
    }
}

fn monthly_usage_of(
    product: &Product,
    counts: &[StockCount],
    movements: &[InboundMovement],
    year: i32,
    month: u32,
    window: &MonthWindow,
) -> MonthlyUsage {
    let figures = derivation::monthly_usage(counts, movements, window);
    MonthlyUsage {
        product_id: product.id,
        product_name: product.name.clone(),
        unit: product.unit.clone(),
        year,
        month,
        start_qty: figures.start_qty,
        incoming_qty: figures.incoming_qty,
        end_qty: figures.end_qty,
        used_qty: figures.used_qty,
        incoming_cost: figures.incoming_cost,
    }
}

fn usage_between_counts_of(
    product: &Product,
    counts: &[StockCount],
    movements: &[InboundMovement],
) -> Option<UsageBetweenCounts> {
    let interval = derivation::usage_between_counts(counts, movements)?;
    Some(UsageBetweenCounts {
        product_id: product.id,
        product_name: product.name.clone(),
        unit: product.unit.clone(),
        previous_count: interval.previous.quantity,
        previous_count_date: interval.previous.count_date.to_string(),
        shipments_between: interval.shipments_between,
        current_count: interval.current.quantity,
        current_count_date: interval.current.count_date.to_string(),
        usage: interval.usage,
    })
}

fn stored_date(value: &str, what: &str, id: i64) -> LedgerResult<chrono::NaiveDate> {
    shared::util::parse_business_date(value).ok_or_else(|| {
        LedgerError::persistence(format!("Stored {what} {id} has an invalid date: {value}"))
    })
}

fn to_count(entry: &StockEntry) -> LedgerResult<StockCount> {
    Ok(StockCount {
        id: entry.id,
        count_date: stored_date(&entry.count_date, "stock entry", entry.id)?,
        quantity: entry.quantity,
        created_at: entry.created_at,
    })
}

fn to_movement(row: &InboundMovementRow) -> LedgerResult<InboundMovement> {
    let origin = match row.origin.as_str() {
        "center_shipment" => MovementOrigin::CenterShipment,
        "shipment" => MovementOrigin::Shipment,
        other => {
            let message = format!("Unknown movement origin: {other}");
            return Err(LedgerError::persistence(message));
        }
    };
    Ok(InboundMovement {
        origin,
        origin_id: row.origin_id,
        quantity: row.quantity,
        cost: row.cost,
        event_date: stored_date(&row.event_date, origin.entity_type(), row.origin_id)?,
        booked_at: row.booked_at,
        reversed: row.reversed,
    })
}

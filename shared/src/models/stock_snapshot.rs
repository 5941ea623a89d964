//! Stock Snapshot Model (月初/月末库存快照)
//!
//! Center-product stock recorded on the first or last day of a month.
//! Snapshots feed the monthly center-stock report only; current stock is
//! still derived from counts.

use serde::{Deserialize, Serialize};

/// Which end of the month a snapshot describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SnapshotType {
    StartOfMonth,
    EndOfMonth,
}

/// Stock snapshot row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockSnapshot {
    pub id: i64,
    pub branch_id: i64,
    pub product_id: i64,
    /// Business date (YYYY-MM-DD format)
    pub snapshot_date: String,
    #[serde(rename = "type")]
    pub snapshot_type: SnapshotType,
    pub quantity: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Record stock snapshot payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshotCreate {
    pub branch_id: Option<i64>,
    pub product_id: i64,
    pub snapshot_date: String,
    #[serde(rename = "type")]
    pub snapshot_type: SnapshotType,
    pub quantity: f64,
}

/// One product line of the monthly center-stock report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStockRow {
    pub product_id: i64,
    pub product_name: String,
    pub unit: String,
    pub start_qty: f64,
    pub end_qty: f64,
    pub incoming_qty: f64,
    pub used_qty: f64,
    pub incoming_cost: f64,
}

/// Monthly center-stock report built from snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStockReport {
    pub branch_id: i64,
    pub year: i32,
    pub month: u32,
    pub rows: Vec<MonthlyStockRow>,
}

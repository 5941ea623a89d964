//! Stock Entry Model (盘点记录)
//!
//! A physical stock count. The most recently created count for a
//! (branch, product) pair is the authoritative base for current stock.

use serde::{Deserialize, Serialize};

/// Stock count row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockEntry {
    pub id: i64,
    pub branch_id: i64,
    pub product_id: i64,
    /// Business date of the count (YYYY-MM-DD format)
    pub count_date: String,
    pub quantity: f64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Record stock count payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntryCreate {
    /// Required for super admins, ignored scope for branch admins
    pub branch_id: Option<i64>,
    pub product_id: i64,
    pub count_date: String,
    pub quantity: f64,
    pub note: Option<String>,
}

/// Correct a count's figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockEntryUpdate {
    pub count_date: Option<String>,
    pub quantity: Option<f64>,
}

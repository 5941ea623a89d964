//! Waste Entry Model (报损)

use serde::{Deserialize, Serialize};

/// Waste entry row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WasteEntry {
    pub id: i64,
    pub branch_id: i64,
    pub product_id: i64,
    /// Business date (YYYY-MM-DD format)
    pub date: String,
    pub quantity: f64,
    /// Reason for the waste
    pub note: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Record waste payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteEntryCreate {
    pub branch_id: Option<i64>,
    pub product_id: i64,
    pub date: String,
    pub quantity: f64,
    pub note: String,
}

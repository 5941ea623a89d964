//! Monthly Report Model (月结报表)
//!
//! Frozen totals of a closed month. Once stored, the month's movement
//! rows are purged.

use serde::{Deserialize, Serialize};

/// Monthly report row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MonthlyReport {
    pub id: i64,
    pub branch_id: i64,
    pub year: i32,
    pub month: i32,
    /// Incoming cash movements of the month
    pub total_revenue: f64,
    /// Expenses plus outgoing cash movements
    pub total_expenses: f64,
    /// Booked shipment and center shipment cost
    pub total_shipments: f64,
    pub net_profit: f64,
    pub closed_by_id: i64,
    pub closed_by_name: String,
    pub created_at: i64,
}

//! Expense Model (支出)

use serde::{Deserialize, Serialize};

/// Expense row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub branch_id: i64,
    /// Expense category reference (catalogue maintained elsewhere)
    pub category_id: i64,
    /// Business date (YYYY-MM-DD format)
    pub date: String,
    pub amount: f64,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub branch_id: Option<i64>,
    pub category_id: i64,
    pub date: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

/// Update expense payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    pub category_id: Option<i64>,
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
}

//! Cash Movement Model (收银流水)

use serde::{Deserialize, Serialize};

/// Payment channel of a cash movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum CashMethod {
    #[default]
    Cash,
    Pos,
    Online,
}

/// Money flowing into or out of the till
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum CashDirection {
    #[default]
    In,
    Out,
}

/// Cash movement row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CashMovement {
    pub id: i64,
    pub branch_id: i64,
    /// Business date (YYYY-MM-DD format)
    pub date: String,
    pub method: CashMethod,
    pub direction: CashDirection,
    pub amount: f64,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create cash movement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovementCreate {
    pub branch_id: Option<i64>,
    pub date: String,
    #[serde(default)]
    pub method: CashMethod,
    #[serde(default)]
    pub direction: CashDirection,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

/// Update cash movement payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashMovementUpdate {
    pub date: Option<String>,
    pub method: Option<CashMethod>,
    pub direction: Option<CashDirection>,
    pub amount: Option<f64>,
    pub description: Option<String>,
}

//! Product Model
//!
//! Stock-keeping products. Center products are supplied by the central
//! kitchen and appear in the monthly usage reports.

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Unit of measure (kg, piece, liter, ...)
    pub unit: String,
    pub stock_code: Option<String>,
    pub is_center_product: bool,
    pub created_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub unit: String,
    pub stock_code: Option<String>,
    #[serde(default)]
    pub is_center_product: bool,
}

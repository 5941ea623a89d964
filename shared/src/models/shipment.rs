//! Shipment Model (供应商到货)
//!
//! Multi-item delivery. Created pending; contributes to stock only after
//! it is booked (`is_stocked`), from `booked_at` onwards.

use serde::{Deserialize, Serialize};

/// Shipment line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShipmentItem {
    pub id: i64,
    pub shipment_id: i64,
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Shipment header with items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Shipment {
    pub id: i64,
    pub branch_id: i64,
    /// Nominal delivery date (YYYY-MM-DD format)
    pub date: String,
    pub total_amount: f64,
    pub is_stocked: bool,
    /// Booked-to-stock timestamp, None while pending
    pub booked_at: Option<i64>,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<ShipmentItem>,
}

/// Shipment line input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentItemInput {
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
}

/// Create shipment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentCreate {
    pub branch_id: Option<i64>,
    pub date: String,
    pub note: Option<String>,
    pub items: Vec<ShipmentItemInput>,
}

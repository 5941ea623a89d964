//! Center Shipment Model (中央厨房配送)
//!
//! Single-product delivery from the central kitchen. Booked to stock at
//! the moment it is recorded.

use serde::{Deserialize, Serialize};

/// Center shipment row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CenterShipment {
    pub id: i64,
    pub branch_id: i64,
    pub product_id: i64,
    /// Nominal delivery date (YYYY-MM-DD format)
    pub date: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Record center shipment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterShipmentCreate {
    pub branch_id: Option<i64>,
    pub product_id: i64,
    pub date: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub note: Option<String>,
}

//! Stock report DTOs
//!
//! Derived figures, never persisted. Quantities are rounded to 3 decimals
//! at the serialization boundary.

use serde::{Deserialize, Serialize};

/// Current stock of one product at one branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentStock {
    pub product_id: i64,
    pub product_name: String,
    pub unit: String,
    pub quantity: f64,
    /// Count date of the base count, None when the product was never counted
    pub last_count_date: Option<String>,
    /// Booked inbound quantity after the base count
    pub incoming_since_count: f64,
}

/// Monthly usage of one product at one branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyUsage {
    pub product_id: i64,
    pub product_name: String,
    pub unit: String,
    pub year: i32,
    pub month: u32,
    pub start_qty: f64,
    pub incoming_qty: f64,
    pub end_qty: f64,
    pub used_qty: f64,
    /// Total price of the month's inbound lines
    pub incoming_cost: f64,
}

/// Usage between the two most recent counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageBetweenCounts {
    pub product_id: i64,
    pub product_name: String,
    pub unit: String,
    pub previous_count: f64,
    pub previous_count_date: String,
    pub shipments_between: f64,
    pub current_count: f64,
    pub current_count_date: String,
    pub usage: f64,
}

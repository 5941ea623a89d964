//! Data models
//!
//! Shared between ledger-server and its clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps are
//! Unix millis, business dates are `YYYY-MM-DD` strings.

pub mod audit_log;
pub mod branch;
pub mod cash_movement;
pub mod center_shipment;
pub mod expense;
pub mod monthly_report;
pub mod product;
pub mod shipment;
pub mod stock_entry;
pub mod stock_report;
pub mod stock_snapshot;
pub mod waste_entry;

// Re-exports
pub use audit_log::*;
pub use branch::*;
pub use cash_movement::*;
pub use center_shipment::*;
pub use expense::*;
pub use monthly_report::*;
pub use product::*;
pub use shipment::*;
pub use stock_entry::*;
pub use stock_report::*;
pub use stock_snapshot::*;
pub use waste_entry::*;

//! Shared types for the branch ledger
//!
//! Common types used by the ledger service and its clients: error codes,
//! response structures, time helpers, and the row/DTO models of every
//! ledger table.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

//! Branch Model (分店)

use serde::{Deserialize, Serialize};

/// Branch entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Branch {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
}

/// Create branch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCreate {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

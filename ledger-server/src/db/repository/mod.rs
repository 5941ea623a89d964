//! Repository Module
//!
//! Free-function CRUD over the ledger tables. Functions that may run inside
//! a caller's transaction take `&mut SqliteConnection`; single-statement
//! readers accept any SQLite executor (pool, connection or transaction).

// Organisation
pub mod branch;
pub mod product;

// Audit
pub mod audit_log;

// Inventory
pub mod center_shipment;
pub mod inbound_movement;
pub mod shipment;
pub mod stock_entry;
pub mod stock_snapshot;
pub mod waste_entry;

// Finance
pub mod cash_movement;
pub mod expense;
pub mod monthly_report;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err)
                if db_err.is_foreign_key_violation() || db_err.is_check_violation() =>
            {
                RepoError::Validation(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

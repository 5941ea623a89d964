//! Unified error codes for the branch ledger
//!
//! This module defines all error codes returned by the ledger service.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: Permission errors
//! - 3xxx: Branch errors
//! - 4xxx: Audit / undo errors
//! - 5xxx: Inventory errors
//! - 6xxx: Finance errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Record belongs to another branch
    BranchScopeDenied = 2004,

    // ==================== 3xxx: Branch ====================
    /// No branch selected for a cross-branch actor
    BranchNotSelected = 3001,
    /// Branch not found
    BranchNotFound = 3002,

    // ==================== 4xxx: Audit ====================
    /// Audit record not found
    AuditRecordNotFound = 4001,
    /// Audit record has already been undone
    AlreadyUndone = 4002,
    /// Action or entity type cannot be undone
    UndoNotSupported = 4003,
    /// Snapshot cannot be applied to the entity
    SnapshotInvalid = 4004,

    // ==================== 5xxx: Inventory ====================
    /// Product not found
    ProductNotFound = 5001,
    /// Stock count not found
    StockEntryNotFound = 5002,
    /// Shipment not found
    ShipmentNotFound = 5003,
    /// Shipment has already been booked to stock
    ShipmentAlreadyStocked = 5004,
    /// Shipment has no items
    ShipmentEmpty = 5005,
    /// Waste entry not found
    WasteEntryNotFound = 5006,
    /// Center shipment not found
    CenterShipmentNotFound = 5007,
    /// Quantity is negative or not finite
    InvalidQuantity = 5008,
    /// Reporting period is invalid
    InvalidPeriod = 5009,
    /// Stock snapshot not found
    StockSnapshotNotFound = 5010,

    // ==================== 6xxx: Finance ====================
    /// Expense not found
    ExpenseNotFound = 6001,
    /// Cash movement not found
    CashMovementNotFound = 6002,
    /// Amount is not positive
    InvalidAmount = 6003,
    /// Monthly report already exists for the period
    MonthlyReportExists = 6101,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::BranchScopeDenied => "Record belongs to another branch",

            // Branch
            ErrorCode::BranchNotSelected => "Branch must be selected",
            ErrorCode::BranchNotFound => "Branch not found",

            // Audit
            ErrorCode::AuditRecordNotFound => "Audit record not found",
            ErrorCode::AlreadyUndone => "Audit record has already been undone",
            ErrorCode::UndoNotSupported => "This action cannot be undone",
            ErrorCode::SnapshotInvalid => "Audit snapshot cannot be applied",

            // Inventory
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::StockEntryNotFound => "Stock count not found",
            ErrorCode::ShipmentNotFound => "Shipment not found",
            ErrorCode::ShipmentAlreadyStocked => "Shipment has already been booked to stock",
            ErrorCode::ShipmentEmpty => "Shipment has no items",
            ErrorCode::WasteEntryNotFound => "Waste entry not found",
            ErrorCode::CenterShipmentNotFound => "Center shipment not found",
            ErrorCode::InvalidQuantity => "Quantity is invalid",
            ErrorCode::InvalidPeriod => "Reporting period is invalid",
            ErrorCode::StockSnapshotNotFound => "Stock snapshot not found",

            // Finance
            ErrorCode::ExpenseNotFound => "Expense not found",
            ErrorCode::CashMovementNotFound => "Cash movement not found",
            ErrorCode::InvalidAmount => "Amount must be positive",
            ErrorCode::MonthlyReportExists => "Monthly report already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2004 => Ok(ErrorCode::BranchScopeDenied),

            // Branch
            3001 => Ok(ErrorCode::BranchNotSelected),
            3002 => Ok(ErrorCode::BranchNotFound),

            // Audit
            4001 => Ok(ErrorCode::AuditRecordNotFound),
            4002 => Ok(ErrorCode::AlreadyUndone),
            4003 => Ok(ErrorCode::UndoNotSupported),
            4004 => Ok(ErrorCode::SnapshotInvalid),

            // Inventory
            5001 => Ok(ErrorCode::ProductNotFound),
            5002 => Ok(ErrorCode::StockEntryNotFound),
            5003 => Ok(ErrorCode::ShipmentNotFound),
            5004 => Ok(ErrorCode::ShipmentAlreadyStocked),
            5005 => Ok(ErrorCode::ShipmentEmpty),
            5006 => Ok(ErrorCode::WasteEntryNotFound),
            5007 => Ok(ErrorCode::CenterShipmentNotFound),
            5008 => Ok(ErrorCode::InvalidQuantity),
            5009 => Ok(ErrorCode::InvalidPeriod),
            5010 => Ok(ErrorCode::StockSnapshotNotFound),

            // Finance
            6001 => Ok(ErrorCode::ExpenseNotFound),
            6002 => Ok(ErrorCode::CashMovementNotFound),
            6003 => Ok(ErrorCode::InvalidAmount),
            6101 => Ok(ErrorCode::MonthlyReportExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::BranchScopeDenied.code(), 2004);
        assert_eq!(ErrorCode::BranchNotFound.code(), 3002);
        assert_eq!(ErrorCode::AuditRecordNotFound.code(), 4001);
        assert_eq!(ErrorCode::AlreadyUndone.code(), 4002);
        assert_eq!(ErrorCode::ShipmentAlreadyStocked.code(), 5004);
        assert_eq!(ErrorCode::MonthlyReportExists.code(), 6101);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::AlreadyUndone.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(4003), Ok(ErrorCode::UndoNotSupported));
        assert_eq!(ErrorCode::try_from(5009), Ok(ErrorCode::InvalidPeriod));
        assert_eq!(ErrorCode::try_from(9002), Ok(ErrorCode::DatabaseError));
        assert!(ErrorCode::try_from(1001).is_err());
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::AlreadyUndone).unwrap();
        assert_eq!(json, "4002");
        let code: ErrorCode = serde_json::from_str("5004").unwrap();
        assert_eq!(code, ErrorCode::ShipmentAlreadyStocked);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::AuditRecordNotFound.to_string(), "4001");
        assert_eq!(format!("{}", InvalidErrorCode(77)), "invalid error code: 77");
    }
}

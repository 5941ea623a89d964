//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors (1xxx is unused and reads as general)
/// - 2xxx: Permission errors
/// - 3xxx: Branch errors
/// - 4xxx: Audit / undo errors
/// - 5xxx: Inventory errors
/// - 6xxx: Finance errors
/// - 7xxx and above: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Permission errors (2xxx)
    Permission,
    /// Branch errors (3xxx)
    Branch,
    /// Audit errors (4xxx)
    Audit,
    /// Inventory errors (5xxx)
    Inventory,
    /// Finance errors (6xxx)
    Finance,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..2000 => Self::General,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Branch,
            4000..5000 => Self::Audit,
            5000..6000 => Self::Inventory,
            6000..7000 => Self::Finance,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Permission => "permission",
            Self::Branch => "branch",
            Self::Audit => "audit",
            Self::Inventory => "inventory",
            Self::Finance => "finance",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(2004), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3002), ErrorCategory::Branch);
        assert_eq!(ErrorCategory::from_code(4002), ErrorCategory::Audit);
        assert_eq!(ErrorCategory::from_code(5004), ErrorCategory::Inventory);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Finance);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::AlreadyUndone.category(), ErrorCategory::Audit);
        assert_eq!(
            ErrorCode::ShipmentAlreadyStocked.category(),
            ErrorCategory::Inventory
        );
        assert_eq!(ErrorCode::BranchNotFound.category(), ErrorCategory::Branch);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Inventory).unwrap();
        assert_eq!(json, "\"inventory\"");
        let category: ErrorCategory = serde_json::from_str("\"audit\"").unwrap();
        assert_eq!(category, ErrorCategory::Audit);
        assert_eq!(category.name(), "audit");
    }
}

//! Input validation helpers
//!
//! Centralized limits and checks shared by the recorder, finance and
//! report operations.

use super::{LedgerError, LedgerResult};
use shared::error::ErrorCode;

// ── Limits ──────────────────────────────────────────────────────────

/// Notes, descriptions, waste reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Maximum quantity in one movement or count
pub const MAX_QUANTITY: f64 = 1_000_000.0;

/// Maximum monetary amount (unit price, expense, cash movement)
pub const MAX_AMOUNT: f64 = 100_000_000.0;

// ── Helpers ─────────────────────────────────────────────────────────

/// Identifiers are positive integers
pub fn validate_id(value: i64, field: &str) -> LedgerResult<()> {
    if value <= 0 {
        return Err(LedgerError::Validation(
            ErrorCode::RequiredField,
            format!("{field} must be a positive identifier, got {value}"),
        ));
    }
    Ok(())
}

fn require_finite(value: f64, field: &str, code: ErrorCode) -> LedgerResult<()> {
    if !value.is_finite() {
        return Err(LedgerError::Validation(
            code,
            format!("{field} must be a finite number, got {value}"),
        ));
    }
    Ok(())
}

/// Stock counts may be zero, never negative
pub fn validate_count_quantity(value: f64, field: &str) -> LedgerResult<()> {
    require_finite(value, field, ErrorCode::InvalidQuantity)?;
    if !(0.0..=MAX_QUANTITY).contains(&value) {
        return Err(LedgerError::Validation(
            ErrorCode::InvalidQuantity,
            format!("{field} must be between 0 and {MAX_QUANTITY}, got {value}"),
        ));
    }
    Ok(())
}

/// Movement quantities must be strictly positive
pub fn validate_movement_quantity(value: f64, field: &str) -> LedgerResult<()> {
    require_finite(value, field, ErrorCode::InvalidQuantity)?;
    if value <= 0.0 || value > MAX_QUANTITY {
        return Err(LedgerError::Validation(
            ErrorCode::InvalidQuantity,
            format!("{field} must be positive and at most {MAX_QUANTITY}, got {value}"),
        ));
    }
    Ok(())
}

/// Unit prices may be zero (free samples), never negative
pub fn validate_price(value: f64, field: &str) -> LedgerResult<()> {
    require_finite(value, field, ErrorCode::InvalidAmount)?;
    if !(0.0..=MAX_AMOUNT).contains(&value) {
        return Err(LedgerError::Validation(
            ErrorCode::InvalidAmount,
            format!("{field} must be between 0 and {MAX_AMOUNT}, got {value}"),
        ));
    }
    Ok(())
}

/// Expense and cash amounts must be strictly positive
pub fn validate_amount(value: f64, field: &str) -> LedgerResult<()> {
    require_finite(value, field, ErrorCode::InvalidAmount)?;
    if value <= 0.0 || value > MAX_AMOUNT {
        return Err(LedgerError::Validation(
            ErrorCode::InvalidAmount,
            format!("{field} must be positive and at most {MAX_AMOUNT}, got {value}"),
        ));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> LedgerResult<()> {
    match value {
        Some(v) => validate_text_len(v, field, max_len),
        None => Ok(()),
    }
}

/// Length limit for free text (notes, descriptions)
pub fn validate_text_len(value: &str, field: &str, max_len: usize) -> LedgerResult<()> {
    if value.len() > max_len {
        return Err(LedgerError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1, "branch_id").is_ok());
        assert!(validate_id(0, "branch_id").is_err());
        assert!(validate_id(-4, "product_id").is_err());
    }

    #[test]
    fn test_count_quantity_allows_zero() {
        assert!(validate_count_quantity(0.0, "quantity").is_ok());
        assert!(validate_count_quantity(12.5, "quantity").is_ok());
        assert!(validate_count_quantity(-0.1, "quantity").is_err());
        assert!(validate_count_quantity(f64::NAN, "quantity").is_err());
    }

    #[test]
    fn test_movement_quantity_must_be_positive() {
        assert!(validate_movement_quantity(0.0, "quantity").is_err());
        assert!(validate_movement_quantity(f64::INFINITY, "quantity").is_err());
        assert!(matches!(
            validate_movement_quantity(-3.0, "quantity"),
            Err(LedgerError::Validation(ErrorCode::InvalidQuantity, _))
        ));
    }

    #[test]
    fn test_text_limits() {
        assert!(validate_text_len("", "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_text_len(&"x".repeat(500), "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "note", MAX_NOTE_LEN).is_err());
        assert!(validate_optional_text(&None, "note", MAX_NOTE_LEN).is_ok());
    }
}

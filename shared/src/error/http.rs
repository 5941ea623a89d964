//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::BranchNotFound
            | Self::AuditRecordNotFound
            | Self::ProductNotFound
            | Self::StockEntryNotFound
            | Self::ShipmentNotFound
            | Self::WasteEntryNotFound
            | Self::CenterShipmentNotFound
            | Self::StockSnapshotNotFound
            | Self::ExpenseNotFound
            | Self::CashMovementNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::AlreadyUndone
            | Self::ShipmentAlreadyStocked
            | Self::MonthlyReportExists => StatusCode::CONFLICT,

            // 403 Forbidden
            Self::PermissionDenied | Self::BranchScopeDenied => StatusCode::FORBIDDEN,

            // 422 Unprocessable (undo requested for an irreversible record)
            Self::UndoNotSupported => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            ErrorCode::AuditRecordNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::BranchNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::AlreadyUndone.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ShipmentAlreadyStocked.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_forbidden_status() {
        assert_eq!(
            ErrorCode::BranchScopeDenied.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::InvalidPeriod.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::UndoNotSupported.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

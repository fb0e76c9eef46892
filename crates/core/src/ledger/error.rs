//! Ledger error types for validation and guard errors.

use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Journal Line Validation ==========
    /// Journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Line amounts cannot be negative.
    #[error("Line {line}: amounts cannot be negative")]
    NegativeAmount {
        /// Zero-based line index.
        line: usize,
    },

    /// A line carries both a debit and a credit.
    #[error("Line {line}: must specify either debit or credit, not both")]
    BothSides {
        /// Zero-based line index.
        line: usize,
    },

    /// A line carries neither a debit nor a credit.
    #[error("Line {line}: debit or credit must be non-zero")]
    ZeroLine {
        /// Zero-based line index.
        line: usize,
    },

    /// Journal entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account type is not one of the five classifications.
    #[error("Invalid account type: {0}")]
    InvalidAccountType(String),

    /// Account code already in use.
    #[error("Account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// Account is referenced by journal lines or expenses.
    #[error(
        "Account {account_id} has ledger activity ({journal_lines} journal lines, {expenses} expenses) and cannot be modified"
    )]
    AccountHasActivity {
        /// The account ID.
        account_id: Uuid,
        /// Journal lines posted to the account.
        journal_lines: u64,
        /// Expenses booked against the account.
        expenses: u64,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::BothSides { .. } => "DEBIT_AND_CREDIT",
            Self::ZeroLine { .. } => "ZERO_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InvalidAccountType(_) => "INVALID_ACCOUNT_TYPE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::AccountHasActivity { .. } => "ACCOUNT_HAS_ACTIVITY",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientLines
            | Self::NegativeAmount { .. }
            | Self::BothSides { .. }
            | Self::ZeroLine { .. }
            | Self::Unbalanced { .. }
            | Self::InvalidAccountType(_)
            | Self::DuplicateAccountCode(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) => 404,

            // 409 Conflict - business rule guards
            Self::AccountHasActivity { .. } => 409,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAccountType(_) => Self::invalid_field("type", err.to_string()),
            LedgerError::DuplicateAccountCode(_) => Self::invalid_field("code", err.to_string()),
            _ => Self::rule(err.http_status_code(), err.error_code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InsufficientLines.error_code(), "INSUFFICIENT_LINES");
        assert_eq!(
            LedgerError::BothSides { line: 0 }.error_code(),
            "DEBIT_AND_CREDIT"
        );
        assert_eq!(
            LedgerError::DuplicateAccountCode("1001".into()).error_code(),
            "DUPLICATE_ACCOUNT_CODE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InsufficientLines.http_status_code(), 400);
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::AccountHasActivity {
                account_id: Uuid::nil(),
                journal_lines: 1,
                expenses: 0,
            }
            .http_status_code(),
            409
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 100.00, Credit: 50.00"
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = LedgerError::AccountNotFound(Uuid::nil()).into();
        assert_eq!(app.status_code(), 404);

        let app: AppError = LedgerError::AccountHasActivity {
            account_id: Uuid::nil(),
            journal_lines: 3,
            expenses: 0,
        }
        .into();
        assert_eq!(app.status_code(), 409);
        assert_eq!(app.error_code(), "CONFLICT");
        assert_eq!(app.domain_code(), Some("ACCOUNT_HAS_ACTIVITY"));

        let app: AppError = LedgerError::InvalidAccountType("cash".into()).into();
        assert!(app.fields().is_some_and(|f| f.contains_key("type")));

        let app: AppError = LedgerError::DuplicateAccountCode("1001".into()).into();
        assert_eq!(app.status_code(), 400);
        assert!(app.fields().is_some_and(|f| f.contains_key("code")));

        let app: AppError = LedgerError::ZeroLine { line: 1 }.into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");
    }
}

//! Reconciliation error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use super::types::ReconciliationStatus;

/// Errors that can occur during reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Reconciliation record not found.
    #[error("Reconciliation not found: {0}")]
    NotFound(Uuid),

    /// Bank account not found.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(Uuid),

    /// Only asset accounts can be reconciled against a bank statement.
    #[error("Account {0} is not an asset account")]
    NotAnAssetAccount(Uuid),

    /// Adjusted book balance does not match the statement.
    #[error("Reconciliation is not balanced. Difference: {difference}")]
    Unbalanced {
        /// `adjusted_balance - closing_balance`.
        difference: Decimal,
    },

    /// Attempted a transition that the current status does not allow.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ReconciliationStatus,
        /// The attempted target status.
        to: ReconciliationStatus,
    },

    /// Attempted to edit a reconciled record.
    #[error("Cannot modify a reconciled record; reset it to draft first")]
    CannotModifyReconciled,

    /// Attempted to delete a reconciled record.
    #[error("Cannot delete a reconciled record")]
    CannotDeleteReconciled,

    /// Statement figures overflow the decimal range.
    #[error("Reconciliation figures are out of range")]
    AmountOutOfRange,
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "RECONCILIATION_NOT_FOUND",
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::NotAnAssetAccount(_) => "NOT_AN_ASSET_ACCOUNT",
            Self::Unbalanced { .. } => "RECONCILIATION_UNBALANCED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::CannotModifyReconciled => "CANNOT_MODIFY_RECONCILED",
            Self::CannotDeleteReconciled => "CANNOT_DELETE_RECONCILED",
            Self::AmountOutOfRange => "AMOUNT_OUT_OF_RANGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::BankAccountNotFound(_) | Self::NotAnAssetAccount(_) | Self::AmountOutOfRange => 400,
            Self::Unbalanced { .. }
            | Self::InvalidTransition { .. }
            | Self::CannotModifyReconciled
            | Self::CannotDeleteReconciled => 409,
        }
    }
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        match err {
            ReconciliationError::BankAccountNotFound(_) | ReconciliationError::NotAnAssetAccount(_) => {
                Self::invalid_field("bank_account_id", err.to_string())
            }
            _ => Self::rule(err.http_status_code(), err.error_code(), err.to_string()),
        }
    }
}

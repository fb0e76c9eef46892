//! Reconciliation arithmetic and lifecycle transitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tally_shared::types::money::is_storable;
use tally_shared::types::{ReconciliationId, Tolerance, UserId};

use super::error::ReconciliationError;
use super::types::{
    Reconciliation, ReconciliationDraft, ReconciliationResult, ReconciliationStatus,
    StatementFigures,
};

/// Compares an adjusted book balance with a bank statement.
///
/// The book balance is caller-supplied input and is never recomputed here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine {
    tolerance: Tolerance,
}

impl ReconciliationEngine {
    /// Creates an engine with the given balance tolerance.
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Computes the adjusted balance and its difference from the statement.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` if a sum overflows or the derived figures
    /// do not fit an amount column.
    pub fn compute(
        &self,
        book_balance: Decimal,
        statement: &StatementFigures,
    ) -> Result<ReconciliationResult, ReconciliationError> {
        let adjusted_balance = statement
            .adjustments
            .net()
            .and_then(|net| book_balance.checked_add(net))
            .ok_or(ReconciliationError::AmountOutOfRange)?;
        let difference = adjusted_balance
            .checked_sub(statement.closing_balance)
            .ok_or(ReconciliationError::AmountOutOfRange)?;
        if !is_storable(adjusted_balance) || !is_storable(difference) {
            return Err(ReconciliationError::AmountOutOfRange);
        }

        Ok(ReconciliationResult {
            book_balance,
            adjusted_balance,
            closing_balance: statement.closing_balance,
            difference,
            is_balanced: self.tolerance.is_negligible(difference),
        })
    }

    /// Computes the result for a stored record.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` if an intermediate sum overflows.
    pub fn evaluate(&self, record: &Reconciliation) -> Result<ReconciliationResult, ReconciliationError> {
        self.compute(record.draft.book_balance, &record.draft.statement)
    }

    /// Marks a draft as reconciled.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the record is already reconciled
    /// - `Unbalanced` if `|difference|` is not below the tolerance
    /// - `AmountOutOfRange` if the figures overflow
    pub fn reconcile(
        &self,
        record: &mut Reconciliation,
        reconciled_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<ReconciliationResult, ReconciliationError> {
        if record.status == ReconciliationStatus::Reconciled {
            return Err(ReconciliationError::InvalidTransition {
                from: record.status,
                to: ReconciliationStatus::Reconciled,
            });
        }

        let result = self.evaluate(record)?;
        if !result.is_balanced {
            return Err(ReconciliationError::Unbalanced {
                difference: result.difference,
            });
        }

        record.status = ReconciliationStatus::Reconciled;
        record.reconciled_at = Some(at);
        record.reconciled_by = Some(reconciled_by);
        Ok(result)
    }
}

impl Reconciliation {
    /// Creates a new record in draft status.
    #[must_use]
    pub fn new_draft(draft: ReconciliationDraft, created_by: UserId) -> Self {
        Self {
            id: ReconciliationId::new(),
            draft,
            status: ReconciliationStatus::Draft,
            reconciled_at: None,
            reconciled_by: None,
            created_by,
        }
    }

    /// Returns true while the record can be edited and deleted.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status == ReconciliationStatus::Draft
    }

    /// Replaces the user-entered fields of a draft.
    ///
    /// # Errors
    ///
    /// Returns `CannotModifyReconciled` if the record is reconciled.
    pub fn update(&mut self, draft: ReconciliationDraft) -> Result<(), ReconciliationError> {
        if !self.is_draft() {
            return Err(ReconciliationError::CannotModifyReconciled);
        }
        self.draft = draft;
        Ok(())
    }

    /// Returns a reconciled record to draft, clearing the reconciliation stamp.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the record is already a draft.
    pub fn reset(&mut self) -> Result<(), ReconciliationError> {
        if self.is_draft() {
            return Err(ReconciliationError::InvalidTransition {
                from: self.status,
                to: ReconciliationStatus::Draft,
            });
        }
        self.status = ReconciliationStatus::Draft;
        self.reconciled_at = None;
        self.reconciled_by = None;
        Ok(())
    }

    /// Guards deletion.
    ///
    /// # Errors
    ///
    /// Returns `CannotDeleteReconciled` if the record is reconciled.
    pub fn ensure_deletable(&self) -> Result<(), ReconciliationError> {
        if self.is_draft() {
            Ok(())
        } else {
            Err(ReconciliationError::CannotDeleteReconciled)
        }
    }
}

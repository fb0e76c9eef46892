//! Bank reconciliation repository.
//!
//! Every write runs in one database transaction. The stored row is re-read
//! with `FOR UPDATE` inside the transaction before a state transition is
//! applied, so concurrent reconcile/reset/update calls serialize per record.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::reconciliation::{
    Reconciliation, ReconciliationDraft, ReconciliationEngine, ReconciliationError,
    ReconciliationResult, ReconciliationStatus, StatementFigures,
};
use tally_shared::AppError;
use tally_shared::types::{AccountId, PageRequest, ReconciliationId, UserId};
use tracing::info;

use super::ledger::balance_of;
use crate::entities::sea_orm_active_enums::{self, AccountType};
use crate::entities::{accounts, bank_reconciliations};

/// Error types for reconciliation persistence.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationRepoError {
    /// Domain rule violation.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReconciliationRepoError> for AppError {
    fn from(err: ReconciliationRepoError) -> Self {
        match err {
            ReconciliationRepoError::Reconciliation(err) => err.into(),
            ReconciliationRepoError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

/// User-entered reconciliation fields.
///
/// When `book_balance` is absent it is computed from the ledger for the bank
/// account as of the statement date.
#[derive(Debug, Clone)]
pub struct ReconciliationInput {
    /// Bank (asset) account being reconciled.
    pub bank_account_id: AccountId,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Statement number.
    pub statement_number: String,
    /// Figures from the bank statement.
    pub statement: StatementFigures,
    /// Book balance override.
    pub book_balance: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Filter options for listing reconciliations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationFilter {
    /// Filter by bank account.
    pub bank_account_id: Option<AccountId>,
    /// Filter by status.
    pub status: Option<ReconciliationStatus>,
}

/// A stored reconciliation with its computed figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReconciliation {
    /// The record.
    pub record: Reconciliation,
    /// Adjusted balance, difference and verdict.
    pub result: ReconciliationResult,
}

/// One page of reconciliations.
#[derive(Debug, Clone)]
pub struct ReconciliationPage {
    /// Records on this page, newest statement first.
    pub items: Vec<StoredReconciliation>,
    /// Total matching records.
    pub total: u64,
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
    engine: ReconciliationEngine,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, engine: ReconciliationEngine) -> Self {
        Self { db, engine }
    }

    /// Computes the result for unsaved input.
    ///
    /// # Errors
    ///
    /// Returns an error if the bank account is missing or not an asset
    /// account, or the query fails.
    pub async fn preview(
        &self,
        input: ReconciliationInput,
    ) -> Result<(ReconciliationDraft, ReconciliationResult), ReconciliationRepoError> {
        let draft = resolve_draft(&self.db, input).await?;
        let result = self.engine.compute(draft.book_balance, &draft.statement)?;
        Ok((draft, result))
    }

    /// Creates a draft reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the bank account is missing or not an asset
    /// account, or the query fails.
    pub async fn create(
        &self,
        input: ReconciliationInput,
        created_by: UserId,
    ) -> Result<StoredReconciliation, ReconciliationRepoError> {
        let txn = self.db.begin().await?;

        let draft = resolve_draft(&txn, input).await?;
        let record = Reconciliation::new_draft(draft, created_by);
        let result = self.engine.evaluate(&record)?;

        let now = Utc::now().into();
        let mut active = bank_reconciliations::ActiveModel {
            id: Set(record.id.into_inner()),
            created_by: Set(created_by.into_inner()),
            created_at: Set(now),
            ..Default::default()
        };
        apply(&mut active, &record, &result);
        active.insert(&txn).await?;

        txn.commit().await?;

        info!(
            reconciliation_id = %record.id,
            bank_account_id = %record.draft.bank_account_id,
            difference = %result.difference,
            "Reconciliation created"
        );
        Ok(StoredReconciliation { record, result })
    }

    /// Finds a reconciliation by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        id: ReconciliationId,
    ) -> Result<Option<StoredReconciliation>, ReconciliationRepoError> {
        let model = bank_reconciliations::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        model.map(|model| self.stored(&model)).transpose()
    }

    /// Gets a reconciliation by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this ID.
    pub async fn get(&self, id: ReconciliationId) -> Result<StoredReconciliation, ReconciliationRepoError> {
        self.find(id)
            .await?
            .ok_or_else(|| ReconciliationError::NotFound(id.into_inner()).into())
    }

    /// Lists reconciliations, newest statement first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ReconciliationFilter,
        page: PageRequest,
    ) -> Result<ReconciliationPage, ReconciliationRepoError> {
        let mut query = bank_reconciliations::Entity::find();

        if let Some(bank_account_id) = filter.bank_account_id {
            query = query
                .filter(bank_reconciliations::Column::BankAccountId.eq(bank_account_id.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(
                bank_reconciliations::Column::Status
                    .eq(sea_orm_active_enums::ReconciliationStatus::from(status)),
            );
        }

        let total = query.clone().count(&self.db).await?;

        let items = query
            .order_by_desc(bank_reconciliations::Column::StatementDate)
            .order_by_desc(bank_reconciliations::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?
            .iter()
            .map(|model| self.stored(model))
            .collect::<Result<Vec<_>, ReconciliationRepoError>>()?;

        Ok(ReconciliationPage { items, total })
    }

    /// Replaces the user-entered fields of a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or reconciled, the bank
    /// account is invalid, or the query fails.
    pub async fn update(
        &self,
        id: ReconciliationId,
        input: ReconciliationInput,
    ) -> Result<StoredReconciliation, ReconciliationRepoError> {
        let txn = self.db.begin().await?;

        let model = lock_row(&txn, id).await?;
        let mut record = Reconciliation::from(&model);
        if !record.is_draft() {
            return Err(ReconciliationError::CannotModifyReconciled.into());
        }

        let draft = resolve_draft(&txn, input).await?;
        record.update(draft)?;

        let stored = self.save(&txn, model, record).await?;
        txn.commit().await?;

        info!(reconciliation_id = %id, difference = %stored.result.difference, "Reconciliation updated");
        Ok(stored)
    }

    /// Marks a balanced draft as reconciled.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing, already reconciled, or
    /// not balanced, or the query fails.
    pub async fn reconcile(
        &self,
        id: ReconciliationId,
        reconciled_by: UserId,
    ) -> Result<StoredReconciliation, ReconciliationRepoError> {
        let txn = self.db.begin().await?;

        let model = lock_row(&txn, id).await?;
        let mut record = Reconciliation::from(&model);
        self.engine.reconcile(&mut record, reconciled_by, Utc::now())?;

        let stored = self.save(&txn, model, record).await?;
        txn.commit().await?;

        info!(reconciliation_id = %id, reconciled_by = %reconciled_by, "Reconciliation completed");
        Ok(stored)
    }

    /// Returns a reconciled record to draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or already a draft, or the
    /// query fails.
    pub async fn reset(&self, id: ReconciliationId) -> Result<StoredReconciliation, ReconciliationRepoError> {
        let txn = self.db.begin().await?;

        let model = lock_row(&txn, id).await?;
        let mut record = Reconciliation::from(&model);
        record.reset()?;

        let stored = self.save(&txn, model, record).await?;
        txn.commit().await?;

        info!(reconciliation_id = %id, "Reconciliation reset to draft");
        Ok(stored)
    }

    /// Deletes a draft reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or reconciled, or the
    /// query fails.
    pub async fn delete(&self, id: ReconciliationId) -> Result<(), ReconciliationRepoError> {
        let txn = self.db.begin().await?;

        let model = lock_row(&txn, id).await?;
        Reconciliation::from(&model).ensure_deletable()?;

        bank_reconciliations::Entity::delete_by_id(model.id)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(reconciliation_id = %id, "Reconciliation deleted");
        Ok(())
    }

    /// Writes the record's mutable fields back onto its row.
    async fn save(
        &self,
        txn: &DatabaseTransaction,
        model: bank_reconciliations::Model,
        record: Reconciliation,
    ) -> Result<StoredReconciliation, ReconciliationRepoError> {
        let result = self.engine.evaluate(&record)?;

        let mut active: bank_reconciliations::ActiveModel = model.into();
        apply(&mut active, &record, &result);
        active.update(txn).await?;

        Ok(StoredReconciliation { record, result })
    }

    fn stored(
        &self,
        model: &bank_reconciliations::Model,
    ) -> Result<StoredReconciliation, ReconciliationRepoError> {
        let record = Reconciliation::from(model);
        let result = self.engine.evaluate(&record)?;
        Ok(StoredReconciliation { record, result })
    }
}

/// Validates the bank account and fills in the book balance.
async fn resolve_draft<C>(
    conn: &C,
    input: ReconciliationInput,
) -> Result<ReconciliationDraft, ReconciliationRepoError>
where
    C: ConnectionTrait,
{
    let account_uuid = input.bank_account_id.into_inner();
    let account = accounts::Entity::find_by_id(account_uuid)
        .one(conn)
        .await?
        .ok_or(ReconciliationError::BankAccountNotFound(account_uuid))?;

    if account.account_type != AccountType::Asset {
        return Err(ReconciliationError::NotAnAssetAccount(account_uuid).into());
    }

    let book_balance = match input.book_balance {
        Some(book_balance) => book_balance,
        None => {
            balance_of(conn, &account, Some(input.statement_date))
                .await?
                .balance
        }
    };

    Ok(ReconciliationDraft {
        bank_account_id: input.bank_account_id,
        statement_date: input.statement_date,
        statement_number: input.statement_number,
        statement: input.statement,
        book_balance,
        notes: input.notes,
    })
}

/// Loads a row with an exclusive lock for the rest of the transaction.
async fn lock_row(
    txn: &DatabaseTransaction,
    id: ReconciliationId,
) -> Result<bank_reconciliations::Model, ReconciliationRepoError> {
    bank_reconciliations::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ReconciliationError::NotFound(id.into_inner()).into())
}

/// Copies user-entered fields, derived figures and lifecycle stamps.
fn apply(
    active: &mut bank_reconciliations::ActiveModel,
    record: &Reconciliation,
    result: &ReconciliationResult,
) {
    let draft = &record.draft;
    let adjustments = &draft.statement.adjustments;

    active.bank_account_id = Set(draft.bank_account_id.into_inner());
    active.statement_date = Set(draft.statement_date);
    active.statement_number = Set(draft.statement_number.clone());
    active.opening_balance = Set(draft.statement.opening_balance);
    active.closing_balance = Set(draft.statement.closing_balance);
    active.deposits_in_transit = Set(adjustments.deposits_in_transit);
    active.outstanding_checks = Set(adjustments.outstanding_checks);
    active.bank_charges = Set(adjustments.bank_charges);
    active.interest_earned = Set(adjustments.interest_earned);
    active.other_adjustments = Set(adjustments.other_adjustments);
    active.book_balance = Set(draft.book_balance);
    active.adjusted_balance = Set(result.adjusted_balance);
    active.difference = Set(result.difference);
    active.notes = Set(draft.notes.clone());
    active.status = Set(record.status.into());
    active.reconciled_at = Set(record.reconciled_at.map(Into::into));
    active.reconciled_by = Set(record.reconciled_by.map(UserId::into_inner));
    active.updated_at = Set(Utc::now().into());
}

#[cfg(test)]
#[path = "reconciliation_tests.rs"]
mod tests;

//! Ledger repository: journal postings and per-account debit/credit totals.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use tally_core::ledger::{
    Account, AccountBalance, AccountTotals, BalanceCalculator, JournalEntry, LedgerError,
    validate_journal_lines,
};
use tally_core::reports::AccountWithTotals;
use tally_shared::AppError;
use tally_shared::types::{AccountId, ExpenseId, JournalEntryId, JournalLineId, UserId};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{accounts, expenses, journal_entries, journal_lines};

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerRepoError {
    /// Domain rule violation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerRepoError> for AppError {
    fn from(err: LedgerRepoError) -> Self {
        match err {
            LedgerRepoError::Ledger(err) => err.into(),
            LedgerRepoError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

/// Grouped debit/credit sums for one account.
#[derive(Debug, Clone, FromQueryResult)]
struct TotalsRow {
    account_id: Uuid,
    debit_total: Option<Decimal>,
    credit_total: Option<Decimal>,
}

impl TotalsRow {
    fn totals(&self) -> AccountTotals {
        AccountTotals::new(
            self.debit_total.unwrap_or_default(),
            self.credit_total.unwrap_or_default(),
        )
    }
}

/// Sums journal lines per account, restricted to entries dated on or before
/// `as_of` (inclusive) and optionally to a set of accounts.
///
/// Accounts without lines in range are absent from the map.
pub(crate) async fn grouped_totals<C>(
    conn: &C,
    account_ids: Option<&[AccountId]>,
    as_of: Option<NaiveDate>,
) -> Result<HashMap<AccountId, AccountTotals>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = journal_lines::Entity::find()
        .select_only()
        .column(journal_lines::Column::AccountId)
        .column_as(Expr::col((journal_lines::Entity, journal_lines::Column::Debit)).sum(), "debit_total")
        .column_as(Expr::col((journal_lines::Entity, journal_lines::Column::Credit)).sum(), "credit_total")
        .join(JoinType::InnerJoin, journal_lines::Relation::JournalEntries.def());

    if let Some(as_of) = as_of {
        query = query.filter(journal_entries::Column::EntryDate.lte(as_of));
    }

    if let Some(ids) = account_ids {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        query = query.filter(
            journal_lines::Column::AccountId.is_in(ids.iter().map(|id| id.into_inner())),
        );
    }

    let rows = query
        .group_by(journal_lines::Column::AccountId)
        .into_model::<TotalsRow>()
        .all(conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (AccountId::from_uuid(row.account_id), row.totals()))
        .collect())
}

/// Computes one account's balance as of a date through any connection.
pub(crate) async fn balance_of<C>(
    conn: &C,
    account: &accounts::Model,
    as_of: Option<NaiveDate>,
) -> Result<AccountBalance, DbErr>
where
    C: ConnectionTrait,
{
    let id = AccountId::from_uuid(account.id);
    let totals = grouped_totals(conn, Some(&[id]), as_of)
        .await?
        .remove(&id)
        .unwrap_or_default();
    Ok(BalanceCalculator::compute(account.account_type.into(), totals))
}

/// Ledger repository for balance queries and postings.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Debit/credit totals for the given accounts over all time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals_for_accounts(
        &self,
        account_ids: &[AccountId],
    ) -> Result<HashMap<AccountId, AccountTotals>, LedgerRepoError> {
        Ok(grouped_totals(&self.db, Some(account_ids), None).await?)
    }

    /// Every account paired with its totals as of `as_of`.
    ///
    /// Accounts without postings carry zero totals. Ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn accounts_with_totals(
        &self,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<AccountWithTotals>, LedgerRepoError> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        let mut totals = grouped_totals(&self.db, None, as_of).await?;
        debug!(
            accounts = accounts.len(),
            accounts_with_postings = totals.len(),
            "Loaded account totals"
        );

        Ok(accounts
            .into_iter()
            .map(|model| {
                let account: Account = model.into();
                let totals = totals.remove(&account.id).unwrap_or_default();
                AccountWithTotals { account, totals }
            })
            .collect())
    }

    /// Computes a single account's balance as of `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn account_balance(
        &self,
        account_id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<(Account, AccountBalance), LedgerRepoError> {
        let model = accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id.into_inner()))?;

        let balance = balance_of(&self.db, &model, as_of).await?;
        Ok((model.into(), balance))
    }

    /// Validates and stores a journal entry with its lines.
    ///
    /// Runs in one database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines fail validation, an account is
    /// missing, or the query fails.
    pub async fn post_journal_entry(
        &self,
        entry: &JournalEntry,
        created_by: Option<UserId>,
    ) -> Result<JournalEntryId, LedgerRepoError> {
        let totals = validate_journal_lines(&entry.lines)?;

        let account_ids: HashSet<Uuid> = entry
            .lines
            .iter()
            .map(|line| line.account_id.into_inner())
            .collect();

        let txn = self.db.begin().await?;

        let found: Vec<Uuid> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Id)
            .filter(accounts::Column::Id.is_in(account_ids.iter().copied()))
            .into_tuple()
            .all(&txn)
            .await?;
        if let Some(missing) = account_ids.iter().find(|id| !found.contains(id)) {
            return Err(LedgerError::AccountNotFound(*missing).into());
        }

        let now = Utc::now().into();
        journal_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            entry_date: Set(entry.date),
            reference: Set(entry.reference.clone()),
            description: Set(entry.description.clone()),
            created_by: Set(created_by.map(UserId::into_inner)),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for line in &entry.lines {
            journal_lines::ActiveModel {
                id: Set(JournalLineId::new().into_inner()),
                journal_entry_id: Set(entry.id.into_inner()),
                account_id: Set(line.account_id.into_inner()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                description: Set(line.description.clone()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(
            journal_entry_id = %entry.id,
            date = %entry.date,
            lines = entry.lines.len(),
            total = %totals.total_debit,
            "Journal entry posted"
        );
        Ok(entry.id)
    }

    /// Records an expense against an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing or the query fails.
    pub async fn record_expense(
        &self,
        account_id: AccountId,
        expense_date: NaiveDate,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<ExpenseId, LedgerRepoError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line: 0 }.into());
        }

        let exists = accounts::Entity::find_by_id(account_id.into_inner())
            .count(&self.db)
            .await?;
        if exists == 0 {
            return Err(LedgerError::AccountNotFound(account_id.into_inner()).into());
        }

        let id = ExpenseId::new();
        expenses::ActiveModel {
            id: Set(id.into_inner()),
            account_id: Set(account_id.into_inner()),
            expense_date: Set(expense_date),
            amount: Set(amount),
            description: Set(description),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(expense_id = %id, account_id = %account_id, amount = %amount, "Expense recorded");
        Ok(id)
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;

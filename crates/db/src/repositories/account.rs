//! Account repository for chart of accounts database operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use tally_core::ledger::{Account, AccountActivity, AccountType, LedgerError, looks_like_cash_equivalent};
use tally_shared::AppError;
use tally_shared::types::{AccountId, PageRequest};
use tracing::info;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::AccountType as DbAccountType;
use crate::entities::{accounts, bank_reconciliations, expenses, journal_entries, journal_lines};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Domain rule violation (not found, duplicate code, activity guard).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Account is referenced by bank reconciliations.
    #[error("Cannot delete account: account has {0} bank reconciliations")]
    HasReconciliations(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Ledger(err) => err.into(),
            AccountError::HasReconciliations(_) => {
                Self::rule(409, "ACCOUNT_HAS_RECONCILIATIONS", err.to_string())
            }
            AccountError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account code (unique).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type.
    pub account_type: AccountType,
    /// Whether the account is active.
    pub is_active: bool,
    /// Cash-equivalent flag; derived from the name when absent.
    pub is_cash_equivalent: Option<bool>,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account code.
    pub code: Option<String>,
    /// Account name.
    pub name: Option<String>,
    /// Account description.
    pub description: Option<Option<String>>,
    /// Account type.
    pub account_type: Option<AccountType>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
    /// Cash-equivalent flag.
    pub is_cash_equivalent: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Case-insensitive substring match on code or name.
    pub search: Option<String>,
}

/// One page of accounts.
#[derive(Debug, Clone)]
pub struct AccountPage {
    /// Accounts on this page, ordered by code.
    pub accounts: Vec<Account>,
    /// Total matching accounts.
    pub total: u64,
}

/// A journal entry header with its amounts on one account.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct RecentEntry {
    /// Journal entry ID.
    pub journal_entry_id: Uuid,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry reference.
    pub reference: Option<String>,
    /// Entry description.
    pub description: Option<String>,
    /// Debits posted to the account by this entry.
    pub debit: Decimal,
    /// Credits posted to the account by this entry.
    pub credit: Decimal,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is already taken or the query fails.
    pub async fn create_account(&self, input: CreateAccountInput) -> Result<Account, AccountError> {
        if self.code_exists(&input.code, None).await? {
            return Err(LedgerError::DuplicateAccountCode(input.code).into());
        }

        let is_cash_equivalent = input
            .is_cash_equivalent
            .unwrap_or_else(|| looks_like_cash_equivalent(&input.name));

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            account_type: Set(input.account_type.into()),
            is_active: Set(input.is_active),
            is_cash_equivalent: Set(is_cash_equivalent),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        info!(account_id = %account.id, code = %account.code, "Account created");
        Ok(account.into())
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(&self, id: AccountId) -> Result<Option<Account>, AccountError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(account.map(Into::into))
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has this ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AccountError> {
        self.find_account(id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id.into_inner()).into())
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<AccountPage, AccountError> {
        let mut query = accounts::Entity::find();

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(DbAccountType::from(account_type)));
        }

        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(accounts::Column::Code)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(accounts::Column::Name)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }

        let total = query.clone().count(&self.db).await?;

        let accounts = query
            .order_by_asc(accounts::Column::Code)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(AccountPage { accounts, total })
    }

    /// Updates an account.
    ///
    /// Accounts with journal lines or expenses are frozen.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing or has activity, the new
    /// code is taken, or the query fails.
    pub async fn update_account(
        &self,
        id: AccountId,
        input: UpdateAccountInput,
    ) -> Result<Account, AccountError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(id.into_inner()))?;

        self.activity(id).await?.ensure_mutable(id)?;

        if let Some(new_code) = &input.code
            && *new_code != account.code
            && self.code_exists(new_code, Some(id)).await?
        {
            return Err(LedgerError::DuplicateAccountCode(new_code.clone()).into());
        }

        let mut active: accounts::ActiveModel = account.into();

        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type.into());
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(is_cash_equivalent) = input.is_cash_equivalent {
            active.is_cash_equivalent = Set(is_cash_equivalent);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let account = active.update(&self.db).await?;
        info!(account_id = %account.id, "Account updated");
        Ok(account.into())
    }

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, has activity or
    /// reconciliations, or the query fails.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AccountError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(id.into_inner()))?;

        self.activity(id).await?.ensure_mutable(id)?;

        let reconciliations = bank_reconciliations::Entity::find()
            .filter(bank_reconciliations::Column::BankAccountId.eq(account.id))
            .count(&self.db)
            .await?;
        if reconciliations > 0 {
            return Err(AccountError::HasReconciliations(reconciliations));
        }

        accounts::Entity::delete_by_id(account.id).exec(&self.db).await?;
        info!(account_id = %account.id, code = %account.code, "Account deleted");
        Ok(())
    }

    /// Counts journal lines and expenses booked against an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn activity(&self, id: AccountId) -> Result<AccountActivity, AccountError> {
        let journal_lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(id.into_inner()))
            .count(&self.db)
            .await?;

        let expenses = expenses::Entity::find()
            .filter(expenses::Column::AccountId.eq(id.into_inner()))
            .count(&self.db)
            .await?;

        Ok(AccountActivity {
            journal_lines,
            expenses,
        })
    }

    /// Most recent journal entries touching an account, newest first.
    ///
    /// An entry with several lines on the account is returned once, with
    /// those lines summed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent_entries(
        &self,
        id: AccountId,
        limit: u64,
    ) -> Result<Vec<RecentEntry>, AccountError> {
        let rows = journal_lines::Entity::find()
            .select_only()
            .column(journal_lines::Column::JournalEntryId)
            .column(journal_entries::Column::EntryDate)
            .column(journal_entries::Column::Reference)
            .column(journal_entries::Column::Description)
            .column_as(Expr::col((journal_lines::Entity, journal_lines::Column::Debit)).sum(), "debit")
            .column_as(Expr::col((journal_lines::Entity, journal_lines::Column::Credit)).sum(), "credit")
            .join(JoinType::InnerJoin, journal_lines::Relation::JournalEntries.def())
            .filter(journal_lines::Column::AccountId.eq(id.into_inner()))
            .group_by(journal_lines::Column::JournalEntryId)
            .group_by(journal_entries::Column::EntryDate)
            .group_by(journal_entries::Column::Reference)
            .group_by(journal_entries::Column::Description)
            .group_by(journal_entries::Column::CreatedAt)
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::CreatedAt)
            .limit(limit)
            .into_model::<RecentEntry>()
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Most recent expenses booked against an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent_expenses(
        &self,
        id: AccountId,
        limit: u64,
    ) -> Result<Vec<expenses::Model>, AccountError> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::AccountId.eq(id.into_inner()))
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Checks whether an account code is taken, optionally ignoring one account.
    async fn code_exists(&self, code: &str, except: Option<AccountId>) -> Result<bool, AccountError> {
        let mut query = accounts::Entity::find().filter(accounts::Column::Code.eq(code));
        if let Some(except) = except {
            query = query.filter(accounts::Column::Id.ne(except.into_inner()));
        }
        Ok(query.count(&self.db).await? > 0)
    }
}

/// Escapes `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;

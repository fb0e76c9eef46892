//! Account management routes.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::ledger::{
    Account, AccountBalance, AccountTotals, AccountType, BalanceCalculator, NormalBalance,
};
use tally_db::entities::expenses;
use tally_db::repositories::{AccountFilter, CreateAccountInput, RecentEntry, UpdateAccountInput};
use tally_shared::types::money::serde_amount;
use tally_shared::types::{AccountId, ExpenseId, JournalEntryId, PageRequest, PageResponse};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{
    ApiPath, ApiQuery, ValidatedJson, flexible_bool_option, trimmed, trimmed_option,
};
use crate::middleware::{AuthUser, Capability};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/{account_id}/balance", get(get_account_balance))
}

/// Query parameters for listing accounts.
#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by account type.
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    /// Filter by active status.
    #[serde(default, deserialize_with = "flexible_bool_option")]
    pub is_active: Option<bool>,
    /// Substring match on code or name.
    #[serde(default)]
    pub search: Option<String>,
    /// Page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Query parameters for a single-account balance.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    /// Inclusive cut-off date; all postings when omitted.
    #[serde(default, alias = "asOfDate")]
    pub as_of_date: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

/// Request body for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Account code (must be unique).
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub code: String,
    /// Account name.
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type: asset, liability, equity, income, expense.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Whether the account is active (default: true).
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Cash-equivalent flag; derived from the name when omitted.
    pub is_cash_equivalent: Option<bool>,
}

/// Request body for updating an account.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    /// Account code.
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub code: Option<String>,
    /// Account name.
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
    /// Account description; an empty string clears it.
    pub description: Option<String>,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
    /// Cash-equivalent flag.
    pub is_cash_equivalent: Option<bool>,
}

/// Account annotated with its all-time balance.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Human-readable type.
    pub type_label: &'static str,
    /// Side on which the balance is positive.
    pub normal_balance: NormalBalance,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account counts towards cash and cash equivalents.
    pub is_cash_equivalent: bool,
    /// Signed balance and totals.
    #[serde(flatten)]
    pub balance: AccountBalance,
}

impl AccountResponse {
    fn new(account: Account, balance: AccountBalance) -> Self {
        Self {
            id: account.id,
            type_label: account.account_type.label(),
            normal_balance: account.account_type.normal_balance(),
            account_type: account.account_type,
            code: account.code,
            name: account.name,
            description: account.description,
            is_active: account.is_active,
            is_cash_equivalent: account.is_cash_equivalent,
            balance,
        }
    }
}

/// Journal entry shown on the account detail view.
#[derive(Debug, Serialize)]
pub struct RecentEntryResponse {
    /// Journal entry ID.
    pub journal_entry_id: JournalEntryId,
    /// Entry date.
    pub date: NaiveDate,
    /// Entry reference.
    pub reference: Option<String>,
    /// Entry description.
    pub description: Option<String>,
    /// Debit posted to this account.
    #[serde(with = "serde_amount")]
    pub debit: Decimal,
    /// Credit posted to this account.
    #[serde(with = "serde_amount")]
    pub credit: Decimal,
}

impl From<RecentEntry> for RecentEntryResponse {
    fn from(entry: RecentEntry) -> Self {
        Self {
            journal_entry_id: JournalEntryId::from_uuid(entry.journal_entry_id),
            date: entry.entry_date,
            reference: entry.reference,
            description: entry.description,
            debit: entry.debit,
            credit: entry.credit,
        }
    }
}

/// Expense shown on the detail view of an expense account.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: ExpenseId,
    /// Expense date.
    pub date: NaiveDate,
    /// Amount.
    #[serde(with = "serde_amount")]
    pub amount: Decimal,
    /// Description.
    pub description: Option<String>,
}

impl From<expenses::Model> for ExpenseResponse {
    fn from(model: expenses::Model) -> Self {
        Self {
            id: ExpenseId::from_uuid(model.id),
            date: model.expense_date,
            amount: model.amount,
            description: model.description,
        }
    }
}

/// Account detail view.
#[derive(Debug, Serialize)]
pub struct AccountDetailResponse {
    /// The account with its balance.
    #[serde(flatten)]
    pub account: AccountResponse,
    /// Most recent journal entries touching the account, newest first.
    pub recent_entries: Vec<RecentEntryResponse>,
    /// Most recent expenses; expense accounts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_expenses: Option<Vec<ExpenseResponse>>,
}

/// Single-account balance as of a date.
#[derive(Debug, Serialize)]
pub struct AccountBalanceResponse {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Cut-off date, if any.
    pub as_of_date: Option<NaiveDate>,
    /// Signed balance and totals.
    #[serde(flatten)]
    pub balance: AccountBalance,
}

/// Lists accounts with their all-time balances.
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListAccountsQuery>,
) -> ApiResult<Json<PageResponse<AccountResponse>>> {
    auth.require(Capability::ReadLedger)?;

    let account_type = query
        .account_type
        .as_deref()
        .map(str::parse::<AccountType>)
        .transpose()?;
    let filter = AccountFilter {
        account_type,
        is_active: query.is_active,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(state.ledger.default_per_page),
    }
    .clamped(state.ledger.max_per_page);
    let (page_number, per_page) = (page.page, page.per_page);

    let result = state.accounts().list_accounts(filter, page).await?;

    let ids: Vec<AccountId> = result.accounts.iter().map(|account| account.id).collect();
    let totals = state.ledger_repo().totals_for_accounts(&ids).await?;

    let data = result
        .accounts
        .into_iter()
        .map(|account| {
            let account_totals = totals.get(&account.id).copied().unwrap_or_default();
            let balance = BalanceCalculator::compute(account.account_type, account_totals);
            AccountResponse::new(account, balance)
        })
        .collect();

    Ok(Json(PageResponse::new(data, page_number, per_page, result.total)))
}

/// Gets an account with its recent activity.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(account_id): ApiPath<Uuid>,
) -> ApiResult<Json<AccountDetailResponse>> {
    auth.require(Capability::ReadLedger)?;

    let id = AccountId::from_uuid(account_id);
    let (account, balance) = state.ledger_repo().account_balance(id, None).await?;

    let repo = state.accounts();
    let recent_entries = repo
        .recent_entries(id, state.ledger.recent_entries_limit)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let recent_expenses = if account.account_type == AccountType::Expense {
        let expenses = repo
            .recent_expenses(id, state.ledger.recent_expenses_limit)
            .await?;
        Some(expenses.into_iter().map(Into::into).collect())
    } else {
        None
    };

    Ok(Json(AccountDetailResponse {
        account: AccountResponse::new(account, balance),
        recent_entries,
        recent_expenses,
    }))
}

/// Creates a new account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    auth.require(Capability::ManageAccounts)?;

    let input = CreateAccountInput {
        account_type: payload.account_type.parse()?,
        code: payload.code,
        name: payload.name,
        description: payload.description.filter(|d| !d.trim().is_empty()),
        is_active: payload.is_active,
        is_cash_equivalent: payload.is_cash_equivalent,
    };

    let account = state.accounts().create_account(input).await?;
    info!(
        account_id = %account.id,
        code = %account.code,
        user_id = %auth.user_id(),
        "Account created via API"
    );

    let balance = BalanceCalculator::compute(account.account_type, AccountTotals::default());
    Ok((StatusCode::CREATED, Json(AccountResponse::new(account, balance))))
}

/// Updates an account that has no ledger activity.
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(account_id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAccountRequest>,
) -> ApiResult<Json<AccountResponse>> {
    auth.require(Capability::ManageAccounts)?;

    let input = UpdateAccountInput {
        code: payload.code,
        name: payload.name,
        description: payload
            .description
            .map(|d| Some(d.trim().to_string()).filter(|d| !d.is_empty())),
        account_type: payload
            .account_type
            .as_deref()
            .map(str::parse::<AccountType>)
            .transpose()?,
        is_active: payload.is_active,
        is_cash_equivalent: payload.is_cash_equivalent,
    };

    let id = AccountId::from_uuid(account_id);
    let account = state.accounts().update_account(id, input).await?;
    info!(account_id = %id, user_id = %auth.user_id(), "Account updated via API");

    // No postings exist, otherwise the update would have been rejected.
    let balance = BalanceCalculator::compute(account.account_type, AccountTotals::default());
    Ok(Json(AccountResponse::new(account, balance)))
}

/// Deletes an account that has no ledger activity.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(account_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require(Capability::ManageAccounts)?;

    let id = AccountId::from_uuid(account_id);
    state.accounts().delete_account(id).await?;
    info!(account_id = %id, user_id = %auth.user_id(), "Account deleted via API");

    Ok(StatusCode::NO_CONTENT)
}

/// Computes one account's balance as of a date.
async fn get_account_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(account_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<BalanceQuery>,
) -> ApiResult<Json<AccountBalanceResponse>> {
    auth.require(Capability::ReadLedger)?;

    let (account, balance) = state
        .ledger_repo()
        .account_balance(AccountId::from_uuid(account_id), query.as_of_date)
        .await?;

    Ok(Json(AccountBalanceResponse {
        account_id: account.id,
        code: account.code,
        name: account.name,
        account_type: account.account_type,
        as_of_date: query.as_of_date,
        balance,
    }))
}

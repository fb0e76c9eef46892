//! Ledger-wide report routes: trial balance and balance summary.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tally_core::reports::{BalanceSummary, TrialBalance};
use tracing::debug;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, flexible_bool};
use crate::middleware::{AuthUser, Capability};

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/trial-balance", get(get_trial_balance))
        .route("/accounts/balance-summary", get(get_balance_summary))
}

/// Query parameters for the trial balance.
#[derive(Debug, Default, Deserialize)]
pub struct TrialBalanceQuery {
    /// Inclusive cut-off date; today when omitted.
    #[serde(default, alias = "asOfDate")]
    pub as_of_date: Option<NaiveDate>,
    /// Keep accounts whose balance is within the zero threshold.
    #[serde(default, alias = "includeZeroBalance", deserialize_with = "flexible_bool")]
    pub include_zero_balance: bool,
}

/// Query parameters for the balance summary.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// Inclusive cut-off date; all postings when omitted.
    #[serde(default, alias = "asOfDate")]
    pub as_of_date: Option<NaiveDate>,
}

/// Builds the trial balance over all active accounts.
async fn get_trial_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<TrialBalanceQuery>,
) -> ApiResult<Json<TrialBalance>> {
    auth.require(Capability::ReadLedger)?;

    let as_of_date = query.as_of_date.unwrap_or_else(|| Utc::now().date_naive());
    let accounts = state.ledger_repo().accounts_with_totals(Some(as_of_date)).await?;

    let report = state
        .trial_balance_builder()
        .build(as_of_date, query.include_zero_balance, accounts);

    debug!(
        as_of_date = %as_of_date,
        accounts = report.accounts.len(),
        difference = %report.totals.difference,
        is_balanced = report.totals.is_balanced,
        "Trial balance built"
    );
    Ok(Json(report))
}

/// Builds the balance summary and accounting equation check.
async fn get_balance_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> ApiResult<Json<BalanceSummary>> {
    auth.require(Capability::ReadLedger)?;

    let accounts = state.ledger_repo().accounts_with_totals(query.as_of_date).await?;
    let summary = state.summary_builder().build(query.as_of_date, accounts);

    debug!(
        as_of_date = ?query.as_of_date,
        accounts = summary.account_counts.total(),
        is_balanced = summary.is_balanced,
        "Balance summary built"
    );
    Ok(Json(summary))
}

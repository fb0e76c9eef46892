//! Balance summary and the accounting equation check.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::Tolerance;

use super::types::{AccountCounts, AccountWithTotals, BalanceSummary};
use crate::ledger::AccountType;

/// Aggregates account balances by type.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryBuilder {
    tolerance: Tolerance,
}

impl SummaryBuilder {
    /// Creates a builder with the given balance tolerance.
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Generates the summary over active accounts.
    ///
    /// Verifies Assets = Liabilities + Equity within the tolerance, and
    /// derives net income as revenue minus expenses.
    #[must_use]
    pub fn build<I>(&self, as_of_date: Option<NaiveDate>, accounts: I) -> BalanceSummary
    where
        I: IntoIterator<Item = AccountWithTotals>,
    {
        let mut total_assets = Decimal::ZERO;
        let mut total_liabilities = Decimal::ZERO;
        let mut total_equity = Decimal::ZERO;
        let mut total_revenue = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        let mut cash_and_cash_equivalents = Decimal::ZERO;
        let mut account_counts = AccountCounts::default();

        for row in accounts.into_iter().filter(|row| row.account.is_active) {
            let balance = row.balance().balance;
            let account_type = row.account.account_type;

            match account_type {
                AccountType::Asset => total_assets += balance,
                AccountType::Liability => total_liabilities += balance,
                AccountType::Equity => total_equity += balance,
                AccountType::Income => total_revenue += balance,
                AccountType::Expense => total_expenses += balance,
            }
            account_counts.increment(account_type);

            if row.account.is_cash_equivalent {
                cash_and_cash_equivalents += balance;
            }
        }

        let calculated_equity = total_assets - total_liabilities;
        let net_income = total_revenue - total_expenses;

        BalanceSummary {
            as_of_date,
            total_assets,
            total_liabilities,
            total_equity,
            total_revenue,
            total_expenses,
            calculated_equity,
            is_balanced: self.tolerance.is_negligible(total_equity - calculated_equity),
            net_income,
            retained_earnings: net_income,
            cash_and_cash_equivalents,
            account_counts,
        }
    }
}

//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;
use tally_shared::types::money::serde_amount;

use crate::ledger::{Account, AccountBalance, AccountTotals, AccountType, BalanceCalculator};

/// An account with its raw totals as of the report date.
#[derive(Debug, Clone)]
pub struct AccountWithTotals {
    /// The account.
    pub account: Account,
    /// Debit and credit sums up to the report date.
    pub totals: AccountTotals,
}

impl AccountWithTotals {
    /// Applies the sign convention.
    #[must_use]
    pub fn balance(&self) -> AccountBalance {
        BalanceCalculator::compute(self.account.account_type, self.totals)
    }
}

/// One account row of a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Account type label.
    pub type_label: String,
    /// Total debit amount.
    #[serde(with = "serde_amount")]
    pub debit_total: Decimal,
    /// Total credit amount.
    #[serde(with = "serde_amount")]
    pub credit_total: Decimal,
    /// Signed balance.
    #[serde(with = "serde_amount")]
    pub balance: Decimal,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Sum of debit totals.
    #[serde(with = "serde_amount")]
    pub total_debit: Decimal,
    /// Sum of credit totals.
    #[serde(with = "serde_amount")]
    pub total_credit: Decimal,
    /// Sum of balances of asset and expense accounts.
    #[serde(with = "serde_amount")]
    pub total_debit_balances: Decimal,
    /// Sum of balances of liability, equity and income accounts.
    #[serde(with = "serde_amount")]
    pub total_credit_balances: Decimal,
    /// `total_debit - total_credit`.
    #[serde(with = "serde_amount")]
    pub difference: Decimal,
    /// Whether `|difference|` is below the balance tolerance.
    pub is_balanced: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    /// As of date (inclusive).
    pub as_of_date: NaiveDate,
    /// Whether zero-balance accounts were kept.
    pub include_zero_balance: bool,
    /// Account rows ordered by type, then code.
    pub accounts: Vec<TrialBalanceLine>,
    /// Totals over `accounts`.
    #[serde(flatten)]
    pub totals: TrialBalanceTotals,
}

/// Number of active accounts per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCounts {
    /// Asset accounts.
    pub asset: u32,
    /// Liability accounts.
    pub liability: u32,
    /// Equity accounts.
    pub equity: u32,
    /// Income accounts.
    pub income: u32,
    /// Expense accounts.
    pub expense: u32,
}

impl AccountCounts {
    /// Counts one account of the given type.
    pub fn increment(&mut self, account_type: AccountType) {
        let slot = match account_type {
            AccountType::Asset => &mut self.asset,
            AccountType::Liability => &mut self.liability,
            AccountType::Equity => &mut self.equity,
            AccountType::Income => &mut self.income,
            AccountType::Expense => &mut self.expense,
        };
        *slot += 1;
    }

    /// Total across all types.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.asset + self.liability + self.equity + self.income + self.expense
    }
}

/// Balance summary with the accounting equation check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// As of date; `None` means all time.
    pub as_of_date: Option<NaiveDate>,
    /// Sum of asset balances.
    #[serde(with = "serde_amount")]
    pub total_assets: Decimal,
    /// Sum of liability balances.
    #[serde(with = "serde_amount")]
    pub total_liabilities: Decimal,
    /// Sum of equity balances.
    #[serde(with = "serde_amount")]
    pub total_equity: Decimal,
    /// Sum of income balances.
    #[serde(with = "serde_amount")]
    pub total_revenue: Decimal,
    /// Sum of expense balances.
    #[serde(with = "serde_amount")]
    pub total_expenses: Decimal,
    /// `total_assets - total_liabilities`.
    #[serde(with = "serde_amount")]
    pub calculated_equity: Decimal,
    /// Whether `|total_equity - calculated_equity|` is below the tolerance.
    pub is_balanced: bool,
    /// `total_revenue - total_expenses`.
    #[serde(with = "serde_amount")]
    pub net_income: Decimal,
    /// Same figure as `net_income`; there is no separate retained earnings ledger.
    #[serde(with = "serde_amount")]
    pub retained_earnings: Decimal,
    /// Sum of balances of accounts flagged as cash equivalents.
    #[serde(with = "serde_amount")]
    pub cash_and_cash_equivalents: Decimal,
    /// Active accounts per type.
    pub account_counts: AccountCounts,
}

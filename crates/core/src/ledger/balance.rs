//! Account balance calculations.
//!
//! Balances are derived on demand from posted lines, never stored:
//! - Asset/Expense: balance = debit total - credit total (debit-normal)
//! - Liability/Equity/Income: balance = credit total - debit total (credit-normal)

use std::collections::HashMap;
use std::ops::AddAssign;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;
use tally_shared::types::money::serde_amount;

use super::account::AccountType;
use super::entry::PostedLine;

/// Raw debit and credit sums for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// Sum of debits.
    pub debit_total: Decimal,
    /// Sum of credits.
    pub credit_total: Decimal,
}

impl AccountTotals {
    /// Creates totals from known sums.
    #[must_use]
    pub const fn new(debit_total: Decimal, credit_total: Decimal) -> Self {
        Self {
            debit_total,
            credit_total,
        }
    }

    /// Adds one line's amounts.
    pub fn add_line(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_total += debit;
        self.credit_total += credit;
    }
}

impl AddAssign for AccountTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.add_line(rhs.debit_total, rhs.credit_total);
    }
}

/// Account balance as of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Signed balance per the account type's normal side.
    #[serde(with = "serde_amount")]
    pub balance: Decimal,
    /// Total debit amount.
    #[serde(with = "serde_amount")]
    pub debit_total: Decimal,
    /// Total credit amount.
    #[serde(with = "serde_amount")]
    pub credit_total: Decimal,
}

/// Derives balances from posted journal lines.
///
/// Pure functions over already-loaded data; the database layer offers the
/// same aggregation as a grouped query.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Applies the sign convention of `account_type` to raw totals.
    #[must_use]
    pub fn compute(account_type: AccountType, totals: AccountTotals) -> AccountBalance {
        AccountBalance {
            balance: account_type
                .normal_balance()
                .signed_balance(totals.debit_total, totals.credit_total),
            debit_total: totals.debit_total,
            credit_total: totals.credit_total,
        }
    }

    /// Sums lines per account on or before `as_of` (inclusive).
    ///
    /// Accounts without lines in range are absent from the map; callers treat
    /// them as zero totals.
    #[must_use]
    pub fn aggregate<'a, I>(lines: I, as_of: Option<NaiveDate>) -> HashMap<AccountId, AccountTotals>
    where
        I: IntoIterator<Item = &'a PostedLine>,
    {
        let mut totals: HashMap<AccountId, AccountTotals> = HashMap::new();
        for line in lines.into_iter().filter(|line| Self::within(line, as_of)) {
            totals
                .entry(line.account_id)
                .or_default()
                .add_line(line.debit, line.credit);
        }
        totals
    }

    fn within(line: &PostedLine, as_of: Option<NaiveDate>) -> bool {
        as_of.is_none_or(|date| line.entry_date <= date)
    }
}

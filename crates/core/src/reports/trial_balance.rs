//! Trial balance generation.

use chrono::NaiveDate;
use tally_shared::types::Tolerance;

use super::types::{AccountWithTotals, TrialBalance, TrialBalanceLine, TrialBalanceTotals};
use crate::ledger::NormalBalance;

/// Builds trial balances from per-account totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialBalanceBuilder {
    balance_tolerance: Tolerance,
    zero_balance_threshold: Tolerance,
}

impl TrialBalanceBuilder {
    /// Creates a builder.
    ///
    /// `balance_tolerance` decides `is_balanced`; `zero_balance_threshold`
    /// decides which accounts count as zero-balance.
    #[must_use]
    pub const fn new(balance_tolerance: Tolerance, zero_balance_threshold: Tolerance) -> Self {
        Self {
            balance_tolerance,
            zero_balance_threshold,
        }
    }

    /// Generates the trial balance as of `as_of_date`.
    ///
    /// Inactive accounts are skipped. Accounts with `|balance|` at or below
    /// the zero-balance threshold are dropped unless `include_zero_balance`.
    /// Totals cover exactly the accounts that are returned.
    #[must_use]
    pub fn build<I>(&self, as_of_date: NaiveDate, include_zero_balance: bool, accounts: I) -> TrialBalance
    where
        I: IntoIterator<Item = AccountWithTotals>,
    {
        let mut lines: Vec<TrialBalanceLine> = accounts
            .into_iter()
            .filter(|row| row.account.is_active)
            .filter_map(|row| {
                let balance = row.balance();
                if !include_zero_balance && self.zero_balance_threshold.is_zero_balance(balance.balance) {
                    return None;
                }
                Some(TrialBalanceLine {
                    account_id: row.account.id,
                    type_label: row.account.account_type.label().to_string(),
                    account_type: row.account.account_type,
                    code: row.account.code,
                    name: row.account.name,
                    debit_total: balance.debit_total,
                    credit_total: balance.credit_total,
                    balance: balance.balance,
                })
            })
            .collect();

        lines.sort_by(|a, b| {
            a.account_type
                .cmp(&b.account_type)
                .then_with(|| a.code.cmp(&b.code))
        });

        let totals = self.totals(&lines);

        TrialBalance {
            as_of_date,
            include_zero_balance,
            accounts: lines,
            totals,
        }
    }

    /// Sums the rows and checks debit/credit equality.
    #[must_use]
    pub fn totals(&self, lines: &[TrialBalanceLine]) -> TrialBalanceTotals {
        let mut totals = TrialBalanceTotals::default();
        for line in lines {
            totals.total_debit += line.debit_total;
            totals.total_credit += line.credit_total;
            match line.account_type.normal_balance() {
                NormalBalance::Debit => totals.total_debit_balances += line.balance,
                NormalBalance::Credit => totals.total_credit_balances += line.balance,
            }
        }
        totals.difference = totals.total_debit - totals.total_credit;
        totals.is_balanced = self.balance_tolerance.is_negligible(totals.difference);
        totals
    }
}

//! Chart of accounts types and the normal-balance sign convention.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::error::LedgerError;

/// Account classification.
///
/// Variant order is the fixed report ordering: asset, liability, equity,
/// income, expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Revenue.
    Income,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in report order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Human-readable label shown next to balances.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// The side on which this account type normally carries its balance.
    ///
    /// - Asset/Expense: debit-normal
    /// - Liability/Equity/Income: credit-normal
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" | "revenue" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(LedgerError::InvalidAccountType(s.to_string())),
        }
    }
}

/// Normal balance side of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Income).
    Credit,
}

impl NormalBalance {
    /// Derives the signed balance from debit and credit totals.
    ///
    /// Debit-normal → `debit - credit`; credit-normal → `credit - debit`.
    #[must_use]
    pub fn signed_balance(self, debit_total: Decimal, credit_total: Decimal) -> Decimal {
        match self {
            Self::Debit => debit_total - credit_total,
            Self::Credit => credit_total - debit_total,
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Unique human code (e.g. "1001"), case-sensitive.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Classification.
    pub account_type: AccountType,
    /// Inactive accounts are left out of reports.
    pub is_active: bool,
    /// Counted in the cash and cash equivalents aggregate.
    pub is_cash_equivalent: bool,
}

/// Default for `is_cash_equivalent` when an account is created without the flag.
///
/// Matches names containing "cash" or "bank", case-insensitive. Only used at
/// creation time; the stored flag is authoritative afterwards.
#[must_use]
pub fn looks_like_cash_equivalent(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("cash") || lower.contains("bank")
}

/// Ledger activity recorded against an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountActivity {
    /// Number of journal lines posted to the account.
    pub journal_lines: u64,
    /// Number of expense records booked against the account.
    pub expenses: u64,
}

impl AccountActivity {
    /// Returns true if anything references the account.
    #[must_use]
    pub const fn has_activity(&self) -> bool {
        self.journal_lines > 0 || self.expenses > 0
    }

    /// Guards update and delete: an account with activity is frozen.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountHasActivity` if any journal line or expense
    /// references the account.
    pub fn ensure_mutable(&self, account_id: AccountId) -> Result<(), LedgerError> {
        if self.has_activity() {
            return Err(LedgerError::AccountHasActivity {
                account_id: account_id.into_inner(),
                journal_lines: self.journal_lines,
                expenses: self.expenses,
            });
        }
        Ok(())
    }
}

//! Double-entry bookkeeping logic.
//!
//! This module implements the read side of the ledger:
//! - Account classification and the normal-balance sign convention
//! - Journal entries and lines
//! - Balance calculations
//! - Journal line validation for the posting side
//! - Error types for ledger operations

pub mod account;
pub mod balance;
pub mod entry;
pub mod error;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use account::{Account, AccountActivity, AccountType, NormalBalance, looks_like_cash_equivalent};
pub use balance::{AccountBalance, AccountTotals, BalanceCalculator};
pub use entry::{JournalEntry, JournalLine, PostedLine};
pub use error::LedgerError;
pub use validation::{TransactionTotals, validate_journal_lines};

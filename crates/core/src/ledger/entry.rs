//! Journal entries and their lines.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, JournalEntryId};

/// A single debit or credit against one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// The account posted to.
    pub account_id: AccountId,
    /// Debit amount (non-negative).
    pub debit: Decimal,
    /// Credit amount (non-negative).
    pub credit: Decimal,
    /// Optional line memo.
    pub description: Option<String>,
}

impl JournalLine {
    /// Creates a debit line.
    #[must_use]
    pub const fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub const fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }
}

/// A dated, immutable double-entry posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Posting date.
    pub date: NaiveDate,
    /// External reference (voucher number, invoice number).
    pub reference: Option<String>,
    /// Narrative.
    pub description: Option<String>,
    /// Ordered lines.
    pub lines: Vec<JournalLine>,
}

/// A journal line paired with the date of its entry.
///
/// This is the shape the balance calculator aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedLine {
    /// The account posted to.
    pub account_id: AccountId,
    /// Date of the owning journal entry.
    pub entry_date: NaiveDate,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

impl JournalEntry {
    /// Flattens the entry into dated lines.
    pub fn posted_lines(&self) -> impl Iterator<Item = PostedLine> + '_ {
        self.lines.iter().map(|line| PostedLine {
            account_id: line.account_id,
            entry_date: self.date,
            debit: line.debit,
            credit: line.credit,
        })
    }
}

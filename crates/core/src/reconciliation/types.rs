//! Reconciliation domain types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::money::serde_amount;
use tally_shared::types::{AccountId, ReconciliationId, UserId};

/// Reconciliation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    /// Editable, deletable; can be reconciled once balanced.
    Draft,
    /// Locked until reset.
    Reconciled,
}

impl ReconciliationStatus {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Reconciled => "reconciled",
        }
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing differences and bank-only items between book and statement.
///
/// Every field defaults to zero when omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Deposits recorded in the books but not yet on the statement.
    #[serde(with = "serde_amount")]
    pub deposits_in_transit: Decimal,
    /// Checks issued but not yet cleared by the bank.
    #[serde(with = "serde_amount")]
    pub outstanding_checks: Decimal,
    /// Fees charged by the bank.
    #[serde(with = "serde_amount")]
    pub bank_charges: Decimal,
    /// Interest credited by the bank.
    #[serde(with = "serde_amount")]
    pub interest_earned: Decimal,
    /// Any other signed adjustment.
    #[serde(with = "serde_amount")]
    pub other_adjustments: Decimal,
}

impl Adjustments {
    /// Net effect on the book balance.
    ///
    /// `+ deposits_in_transit - outstanding_checks - bank_charges + interest_earned + other_adjustments`
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn net(&self) -> Option<Decimal> {
        self.deposits_in_transit
            .checked_sub(self.outstanding_checks)?
            .checked_sub(self.bank_charges)?
            .checked_add(self.interest_earned)?
            .checked_add(self.other_adjustments)
    }
}

/// Figures taken from the bank statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFigures {
    /// Opening balance on the statement (informational).
    #[serde(with = "serde_amount")]
    pub opening_balance: Decimal,
    /// Closing balance on the statement.
    #[serde(with = "serde_amount")]
    pub closing_balance: Decimal,
    /// Adjustments to reconcile book to bank.
    #[serde(flatten)]
    pub adjustments: Adjustments,
}

/// Outcome of comparing the adjusted book balance with the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Book balance the comparison started from.
    #[serde(with = "serde_amount")]
    pub book_balance: Decimal,
    /// Book balance after adjustments.
    #[serde(with = "serde_amount")]
    pub adjusted_balance: Decimal,
    /// Statement closing balance.
    #[serde(with = "serde_amount")]
    pub closing_balance: Decimal,
    /// `adjusted_balance - closing_balance`.
    #[serde(with = "serde_amount")]
    pub difference: Decimal,
    /// Whether `|difference|` is below the tolerance.
    pub is_balanced: bool,
}

/// User-entered fields of a reconciliation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationDraft {
    /// Bank or cash account being reconciled.
    pub bank_account_id: AccountId,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Statement number as printed by the bank.
    pub statement_number: String,
    /// Statement figures and adjustments.
    pub statement: StatementFigures,
    /// Book balance of the bank account as of the statement date.
    pub book_balance: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A persisted bank reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Record ID.
    pub id: ReconciliationId,
    /// User-entered fields.
    pub draft: ReconciliationDraft,
    /// Lifecycle status.
    pub status: ReconciliationStatus,
    /// When the record was reconciled.
    pub reconciled_at: Option<DateTime<Utc>>,
    /// Who reconciled the record.
    pub reconciled_by: Option<UserId>,
    /// Who created the record.
    pub created_by: UserId,
}

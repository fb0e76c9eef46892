//! Business rule validation for journal lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::JournalLine;
use super::error::LedgerError;

/// Debit and credit totals of a validated journal entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// Sum of all debit amounts.
    pub total_debit: Decimal,
    /// Sum of all credit amounts.
    pub total_credit: Decimal,
}

impl TransactionTotals {
    /// Returns true if debits equal credits exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// Validates the lines of a journal entry before it is posted.
///
/// Rules:
/// - at least two lines
/// - amounts are non-negative
/// - a line carries a debit or a credit, never both, never neither
/// - total debits equal total credits
///
/// # Errors
///
/// Returns the first rule violation found, scanning lines in order.
pub fn validate_journal_lines(lines: &[JournalLine]) -> Result<TransactionTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    let mut totals = TransactionTotals::default();

    for (line, entry) in lines.iter().enumerate() {
        if entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line });
        }

        match (entry.debit.is_zero(), entry.credit.is_zero()) {
            (false, false) => return Err(LedgerError::BothSides { line }),
            (true, true) => return Err(LedgerError::ZeroLine { line }),
            _ => {}
        }

        totals.total_debit += entry.debit;
        totals.total_credit += entry.credit;
    }

    if !totals.is_balanced() {
        return Err(LedgerError::Unbalanced {
            debit: totals.total_debit,
            credit: totals.total_credit,
        });
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::AccountId;

    #[test]
    fn test_balanced_lines() {
        let lines = vec![
            JournalLine::debit(AccountId::new(), dec!(100.00)),
            JournalLine::credit(AccountId::new(), dec!(60.00)),
            JournalLine::credit(AccountId::new(), dec!(40.00)),
        ];
        let totals = validate_journal_lines(&lines).unwrap();
        assert_eq!(totals.total_debit, dec!(100.00));
        assert_eq!(totals.total_credit, dec!(100.00));
    }

    #[test]
    fn test_single_line_rejected() {
        let lines = vec![JournalLine::debit(AccountId::new(), dec!(100))];
        assert!(matches!(
            validate_journal_lines(&lines),
            Err(LedgerError::InsufficientLines)
        ));
    }

    #[test]
    fn test_both_sides_rejected() {
        let mut both = JournalLine::debit(AccountId::new(), dec!(50));
        both.credit = dec!(50);
        let lines = vec![JournalLine::credit(AccountId::new(), dec!(0.01)), both];
        assert!(matches!(
            validate_journal_lines(&lines),
            Err(LedgerError::BothSides { line: 1 })
        ));
    }

    #[test]
    fn test_zero_line_rejected() {
        let lines = vec![
            JournalLine::debit(AccountId::new(), Decimal::ZERO),
            JournalLine::credit(AccountId::new(), dec!(10)),
        ];
        assert!(matches!(
            validate_journal_lines(&lines),
            Err(LedgerError::ZeroLine { line: 0 })
        ));
    }

    #[test]
    fn test_negative_rejected() {
        let lines = vec![
            JournalLine::debit(AccountId::new(), dec!(10)),
            JournalLine::credit(AccountId::new(), dec!(-10)),
        ];
        assert!(matches!(
            validate_journal_lines(&lines),
            Err(LedgerError::NegativeAmount { line: 1 })
        ));
    }

    #[test]
    fn test_unbalanced_rejected() {
        let lines = vec![
            JournalLine::debit(AccountId::new(), dec!(100)),
            JournalLine::credit(AccountId::new(), dec!(99.99)),
        ];
        assert!(matches!(
            validate_journal_lines(&lines),
            Err(LedgerError::Unbalanced { .. })
        ));
    }
}

//! Property-based tests for journal line validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::entry::JournalLine;
use super::error::LedgerError;
use super::validation::validate_journal_lines;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a set of debit amounts for one entry.
fn debit_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 1..8)
}

/// Builds a balanced entry: the given debits against one offsetting credit.
fn balanced_lines(debits: &[Decimal]) -> Vec<JournalLine> {
    let total: Decimal = debits.iter().copied().sum();
    let mut lines: Vec<JournalLine> = debits
        .iter()
        .map(|amount| JournalLine::debit(AccountId::new(), *amount))
        .collect();
    lines.push(JournalLine::credit(AccountId::new(), total));
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balanced entries are accepted and report their totals.
    #[test]
    fn prop_balanced_lines_accepted(debits in debit_amounts()) {
        let lines = balanced_lines(&debits);
        let totals = validate_journal_lines(&lines);
        prop_assert!(totals.is_ok(), "balanced entry rejected: {:?}", totals);

        let totals = totals.unwrap();
        let expected: Decimal = debits.iter().copied().sum();
        prop_assert_eq!(totals.total_debit, expected);
        prop_assert_eq!(totals.total_credit, expected);
    }

    /// Any debit/credit mismatch is rejected as unbalanced.
    #[test]
    fn prop_unbalanced_lines_rejected(
        debits in debit_amounts(),
        skew in positive_amount(),
    ) {
        let mut lines = balanced_lines(&debits);
        if let Some(last) = lines.last_mut() {
            last.credit += skew;
        }

        let result = validate_journal_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::Unbalanced { .. })),
            "expected Unbalanced, got: {:?}",
            result
        );
    }

    /// A line with both sides set is rejected even when the entry balances.
    #[test]
    fn prop_line_with_both_sides_rejected(
        debits in debit_amounts(),
        extra in positive_amount(),
    ) {
        let mut lines = balanced_lines(&debits);
        lines[0].debit += extra;
        lines[0].credit = extra;

        let result = validate_journal_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::BothSides { line: 0 })),
            "expected BothSides, got: {:?}",
            result
        );
    }
}

//! Unit and property-based tests for the reconciliation engine.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{AccountId, Tolerance, UserId};

use super::engine::ReconciliationEngine;
use super::error::ReconciliationError;
use super::types::{
    Adjustments, Reconciliation, ReconciliationDraft, ReconciliationStatus, StatementFigures,
};

fn statement(closing_balance: Decimal) -> StatementFigures {
    StatementFigures {
        opening_balance: dec!(48000),
        closing_balance,
        adjustments: Adjustments {
            deposits_in_transit: dec!(2000),
            outstanding_checks: dec!(1500),
            bank_charges: dec!(100),
            interest_earned: dec!(50),
            other_adjustments: Decimal::ZERO,
        },
    }
}

fn draft(closing_balance: Decimal) -> ReconciliationDraft {
    ReconciliationDraft {
        bank_account_id: AccountId::new(),
        statement_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        statement_number: "STMT-2025-01".to_string(),
        statement: statement(closing_balance),
        book_balance: dec!(50000),
        notes: None,
    }
}

fn engine() -> ReconciliationEngine {
    ReconciliationEngine::new(Tolerance::CENT)
}

#[test]
fn test_balanced_statement_reconciles() {
    let mut record = Reconciliation::new_draft(draft(dec!(50450)), UserId::new());
    let reconciler = UserId::new();

    let result = engine().reconcile(&mut record, reconciler, Utc::now()).unwrap();

    assert_eq!(result.adjusted_balance, dec!(50450));
    assert_eq!(result.difference, Decimal::ZERO);
    assert!(result.is_balanced);
    assert_eq!(record.status, ReconciliationStatus::Reconciled);
    assert_eq!(record.reconciled_by, Some(reconciler));
    assert!(record.reconciled_at.is_some());
}

#[test]
fn test_unbalanced_statement_is_rejected() {
    let mut record = Reconciliation::new_draft(draft(dec!(50000)), UserId::new());

    let result = engine().evaluate(&record).unwrap();
    assert_eq!(result.difference, dec!(450));
    assert!(!result.is_balanced);

    let err = engine()
        .reconcile(&mut record, UserId::new(), Utc::now())
        .unwrap_err();
    assert!(matches!(err, ReconciliationError::Unbalanced { difference } if difference == dec!(450)));
    assert_eq!(record.status, ReconciliationStatus::Draft);
    assert!(record.reconciled_at.is_none());
}

#[test]
fn test_second_reconcile_is_rejected_without_changes() {
    let mut record = Reconciliation::new_draft(draft(dec!(50450)), UserId::new());
    let first_by = UserId::new();
    engine().reconcile(&mut record, first_by, Utc::now()).unwrap();
    let snapshot = record.clone();

    let err = engine()
        .reconcile(&mut record, UserId::new(), Utc::now())
        .unwrap_err();

    assert!(matches!(err, ReconciliationError::InvalidTransition { .. }));
    assert_eq!(record, snapshot);
    assert_eq!(record.reconciled_by, Some(first_by));
}

#[test]
fn test_reconciled_record_is_locked() {
    let mut record = Reconciliation::new_draft(draft(dec!(50450)), UserId::new());
    engine().reconcile(&mut record, UserId::new(), Utc::now()).unwrap();

    assert!(matches!(
        record.update(draft(dec!(1))),
        Err(ReconciliationError::CannotModifyReconciled)
    ));
    assert!(matches!(
        record.ensure_deletable(),
        Err(ReconciliationError::CannotDeleteReconciled)
    ));
}

#[test]
fn test_reset_returns_to_draft() {
    let mut record = Reconciliation::new_draft(draft(dec!(50450)), UserId::new());
    engine().reconcile(&mut record, UserId::new(), Utc::now()).unwrap();

    record.reset().unwrap();

    assert!(record.is_draft());
    assert!(record.reconciled_at.is_none());
    assert!(record.reconciled_by.is_none());
    assert!(record.ensure_deletable().is_ok());
    assert!(record.update(draft(dec!(50000))).is_ok());
    assert!(matches!(
        record.reset(),
        Err(ReconciliationError::InvalidTransition { .. })
    ));
}

#[test]
fn test_adjustments_default_to_zero() {
    let adjustments: Adjustments = serde_json::from_str("{}").unwrap();
    assert_eq!(adjustments, Adjustments::default());

    let figures = StatementFigures {
        opening_balance: Decimal::ZERO,
        closing_balance: dec!(100),
        adjustments,
    };
    let result = engine().compute(dec!(100), &figures).unwrap();
    assert!(result.is_balanced);
    assert_eq!(result.adjusted_balance, dec!(100));
}

#[test]
fn test_tolerance_boundary() {
    let figures = StatementFigures {
        closing_balance: dec!(100),
        ..StatementFigures::default()
    };
    assert!(engine().compute(dec!(100.009), &figures).unwrap().is_balanced);
    assert!(!engine().compute(dec!(100.01), &figures).unwrap().is_balanced);
    assert!(!engine().compute(dec!(99.99), &figures).unwrap().is_balanced);
}

#[test]
fn test_overflowing_figures_are_rejected() {
    let figures = StatementFigures {
        adjustments: Adjustments {
            deposits_in_transit: Decimal::ONE,
            ..Adjustments::default()
        },
        ..StatementFigures::default()
    };

    let err = engine().compute(Decimal::MAX, &figures).unwrap_err();
    assert!(matches!(err, ReconciliationError::AmountOutOfRange));

    let figures = StatementFigures {
        closing_balance: Decimal::MAX,
        ..StatementFigures::default()
    };
    let err = engine().compute(Decimal::MIN, &figures).unwrap_err();
    assert!(matches!(err, ReconciliationError::AmountOutOfRange));
}

#[test]
fn test_unstorable_difference_is_rejected() {
    let figures = StatementFigures {
        closing_balance: dec!(-999999999999999),
        ..StatementFigures::default()
    };

    let err = engine().compute(dec!(999999999999999), &figures).unwrap_err();
    assert!(matches!(err, ReconciliationError::AmountOutOfRange));
}

#[test]
fn test_overflowing_record_cannot_be_reconciled() {
    let mut figures = StatementFigures::default();
    figures.adjustments.interest_earned = Decimal::MAX;
    figures.adjustments.other_adjustments = Decimal::MAX;
    let mut record = Reconciliation::new_draft(
        ReconciliationDraft {
            statement: figures,
            ..draft(Decimal::ZERO)
        },
        UserId::new(),
    );

    let err = engine()
        .reconcile(&mut record, UserId::new(), Utc::now())
        .unwrap_err();
    assert!(matches!(err, ReconciliationError::AmountOutOfRange));
    assert!(record.is_draft());
}

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// adjusted = book + deposits - checks - charges + interest + other;
    /// difference = adjusted - closing.
    #[test]
    fn prop_adjusted_balance_formula(
        book in amount(),
        closing in amount(),
        deposits in amount(),
        checks in amount(),
        charges in amount(),
        interest in amount(),
        other in -100_000i64..100_000,
    ) {
        let other = Decimal::new(other, 2);
        let figures = StatementFigures {
            opening_balance: Decimal::ZERO,
            closing_balance: closing,
            adjustments: Adjustments {
                deposits_in_transit: deposits,
                outstanding_checks: checks,
                bank_charges: charges,
                interest_earned: interest,
                other_adjustments: other,
            },
        };

        let result = engine().compute(book, &figures).unwrap();
        let expected = book + deposits - checks - charges + interest + other;
        prop_assert_eq!(result.adjusted_balance, expected);
        prop_assert_eq!(result.difference, expected - closing);
        prop_assert_eq!(result.is_balanced, (expected - closing).abs() < dec!(0.01));
    }

    /// Setting the closing balance to the adjusted balance always reconciles.
    #[test]
    fn prop_matching_statement_reconciles(book in amount(), deposits in amount()) {
        let mut figures = StatementFigures::default();
        figures.adjustments.deposits_in_transit = deposits;
        figures.closing_balance = book + deposits;

        let mut record = Reconciliation::new_draft(
            ReconciliationDraft {
                bank_account_id: AccountId::new(),
                statement_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
                statement_number: "P-1".to_string(),
                statement: figures,
                book_balance: book,
                notes: None,
            },
            UserId::new(),
        );

        prop_assert!(engine().reconcile(&mut record, UserId::new(), Utc::now()).is_ok());
        prop_assert!(engine().reconcile(&mut record, UserId::new(), Utc::now()).is_err());
    }
}

//! Unit and property-based tests for reports module.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{AccountId, Tolerance};

use super::summary::SummaryBuilder;
use super::trial_balance::TrialBalanceBuilder;
use super::types::AccountWithTotals;
use crate::ledger::{Account, AccountTotals, AccountType, BalanceCalculator, JournalLine, PostedLine};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

fn account(code: &str, name: &str, account_type: AccountType) -> Account {
    Account {
        id: AccountId::new(),
        code: code.to_string(),
        name: name.to_string(),
        description: None,
        account_type,
        is_active: true,
        is_cash_equivalent: crate::ledger::looks_like_cash_equivalent(name),
    }
}

fn row(account: Account, debit: Decimal, credit: Decimal) -> AccountWithTotals {
    AccountWithTotals {
        account,
        totals: AccountTotals::new(debit, credit),
    }
}

fn builder() -> TrialBalanceBuilder {
    TrialBalanceBuilder::new(Tolerance::CENT, Tolerance::CENT)
}

/// Chart used by the scenario tests: Cash on Hand (1001) funded by capital,
/// then 3,000 spent on supplies.
fn scenario_rows() -> Vec<AccountWithTotals> {
    vec![
        row(account("5001", "Office Supplies", AccountType::Expense), dec!(3000), Decimal::ZERO),
        row(account("1001", "Cash on Hand", AccountType::Asset), dec!(10000), dec!(3000)),
        row(account("3001", "Owner Capital", AccountType::Equity), Decimal::ZERO, dec!(10000)),
        row(account("2001", "Accounts Payable", AccountType::Liability), Decimal::ZERO, Decimal::ZERO),
        row(account("1002", "City Bank", AccountType::Asset), Decimal::ZERO, Decimal::ZERO),
    ]
}

#[test]
fn test_trial_balance_scenario() {
    let report = builder().build(as_of(), false, scenario_rows());

    let codes: Vec<&str> = report.accounts.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["1001", "3001", "5001"]);

    assert_eq!(report.totals.total_debit, dec!(13000));
    assert_eq!(report.totals.total_credit, dec!(13000));
    assert_eq!(report.totals.total_debit_balances, dec!(10000));
    assert_eq!(report.totals.total_credit_balances, dec!(10000));
    assert_eq!(report.totals.difference, Decimal::ZERO);
    assert!(report.totals.is_balanced);
    assert_eq!(report.accounts[0].balance, dec!(7000));
    assert_eq!(report.accounts[0].type_label, "Asset");
}

#[test]
fn test_trial_balance_orders_by_type_then_code() {
    let report = builder().build(as_of(), true, scenario_rows());

    let codes: Vec<&str> = report.accounts.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["1001", "1002", "2001", "3001", "5001"]);
}

#[test]
fn test_trial_balance_skips_inactive_accounts() {
    let mut rows = scenario_rows();
    rows[1].account.is_active = false;

    let report = builder().build(as_of(), true, rows);

    assert!(report.accounts.iter().all(|a| a.code != "1001"));
    assert!(!report.totals.is_balanced);
    assert_eq!(report.totals.difference, dec!(-7000));
}

#[test]
fn test_trial_balance_tolerance_is_strict() {
    let rows = vec![
        row(account("1001", "Cash", AccountType::Asset), dec!(100.01), Decimal::ZERO),
        row(account("3001", "Capital", AccountType::Equity), Decimal::ZERO, dec!(100)),
    ];
    let report = builder().build(as_of(), true, rows.clone());
    assert_eq!(report.totals.difference, dec!(0.01));
    assert!(!report.totals.is_balanced);

    let lenient = TrialBalanceBuilder::new(Tolerance::new(dec!(0.05)).unwrap(), Tolerance::CENT);
    assert!(lenient.build(as_of(), true, rows).totals.is_balanced);
}

#[test]
fn test_zero_balance_boundary() {
    let rows = vec![
        row(account("1001", "Cash", AccountType::Asset), dec!(0.01), Decimal::ZERO),
        row(account("1002", "Bank", AccountType::Asset), dec!(0.02), Decimal::ZERO),
        row(account("2001", "Payable", AccountType::Liability), dec!(5), dec!(5)),
    ];
    let report = builder().build(as_of(), false, rows);

    let codes: Vec<&str> = report.accounts.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["1002"]);
}

#[test]
fn test_trial_balance_serializes_flat_totals() {
    let report = builder().build(as_of(), false, scenario_rows());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["as_of_date"], "2025-01-31");
    assert_eq!(json["total_debit"], serde_json::json!(13000.0));
    assert_eq!(json["is_balanced"], true);
    assert_eq!(json["accounts"][0]["type"], "asset");
    assert_eq!(json["accounts"][0]["balance"], serde_json::json!(7000.0));
}

#[test]
fn test_summary_scenario() {
    let summary = SummaryBuilder::new(Tolerance::CENT).build(Some(as_of()), scenario_rows());

    assert_eq!(summary.total_assets, dec!(7000));
    assert_eq!(summary.total_liabilities, Decimal::ZERO);
    assert_eq!(summary.total_equity, dec!(10000));
    assert_eq!(summary.total_expenses, dec!(3000));
    assert_eq!(summary.calculated_equity, dec!(7000));
    assert_eq!(summary.net_income, dec!(-3000));
    assert_eq!(summary.retained_earnings, summary.net_income);
    // Expenses are not closed into equity, so the equation is reported as off.
    assert!(!summary.is_balanced);
    assert_eq!(summary.cash_and_cash_equivalents, dec!(7000));
    assert_eq!(summary.account_counts.asset, 2);
    assert_eq!(summary.account_counts.total(), 5);
}

#[test]
fn test_summary_cash_uses_flag_not_name() {
    let mut rows = vec![
        row(account("1001", "Cash on Hand", AccountType::Asset), dec!(500), Decimal::ZERO),
        row(account("1100", "Money Market", AccountType::Asset), dec!(250), Decimal::ZERO),
        row(account("3001", "Capital", AccountType::Equity), Decimal::ZERO, dec!(750)),
    ];
    rows[0].account.is_cash_equivalent = false;
    rows[1].account.is_cash_equivalent = true;

    let summary = SummaryBuilder::default().build(None, rows);

    assert_eq!(summary.cash_and_cash_equivalents, dec!(250));
    assert!(summary.is_balanced);
    assert_eq!(summary.as_of_date, None);
}

// =========================================================================
// Properties over generated ledgers
// =========================================================================

/// One generated posting: debit account index, credit account index, amount in cents.
fn posting() -> impl Strategy<Value = (usize, usize, i64)> {
    (0usize..5, 0usize..5, 1i64..10_000_000)
}

/// One account per type, in `AccountType::ALL` order.
fn chart() -> Vec<Account> {
    AccountType::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| account(&format!("{}001", i + 1), t.label(), *t))
        .collect()
}

/// Expands postings into balanced journal lines and aggregates them per account.
fn ledger_rows(chart: &[Account], postings: &[(usize, usize, i64)]) -> Vec<AccountWithTotals> {
    let date = as_of();
    let lines: Vec<PostedLine> = postings
        .iter()
        .flat_map(|(dr, cr, cents)| {
            let amount = Decimal::new(*cents, 2);
            [
                JournalLine::debit(chart[*dr].id, amount),
                JournalLine::credit(chart[*cr].id, amount),
            ]
        })
        .map(|line| PostedLine {
            account_id: line.account_id,
            entry_date: date,
            debit: line.debit,
            credit: line.credit,
        })
        .collect();

    let totals = BalanceCalculator::aggregate(&lines, Some(date));
    chart
        .iter()
        .map(|account| AccountWithTotals {
            account: account.clone(),
            totals: totals.get(&account.id).copied().unwrap_or_default(),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every trial balance row obeys the sign convention of its type.
    #[test]
    fn prop_trial_balance_rows_follow_sign_convention(
        postings in prop::collection::vec(posting(), 0..30),
        include_zero in any::<bool>(),
    ) {
        let chart = chart();
        let report = builder().build(as_of(), include_zero, ledger_rows(&chart, &postings));

        for line in &report.accounts {
            let expected = match line.account_type {
                AccountType::Asset | AccountType::Expense => line.debit_total - line.credit_total,
                _ => line.credit_total - line.debit_total,
            };
            prop_assert_eq!(line.balance, expected);
        }
    }

    /// total_debit - total_credit == total_debit_balances - total_credit_balances,
    /// and a ledger of balanced entries always balances.
    #[test]
    fn prop_trial_balance_identity(postings in prop::collection::vec(posting(), 0..30)) {
        let chart = chart();
        let report = builder().build(as_of(), true, ledger_rows(&chart, &postings));
        let totals = report.totals;

        prop_assert_eq!(
            totals.total_debit - totals.total_credit,
            totals.total_debit_balances - totals.total_credit_balances
        );
        prop_assert_eq!(totals.difference, Decimal::ZERO);
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(report.accounts.len(), chart.len());
    }

    /// The filter drops exactly the accounts with |balance| <= 0.01.
    #[test]
    fn prop_zero_balance_filter(
        balances in prop::collection::vec(-300i64..300, 1..20),
    ) {
        let rows: Vec<AccountWithTotals> = balances
            .iter()
            .enumerate()
            .map(|(i, cents)| {
                let amount = Decimal::new(*cents, 2);
                let (debit, credit) = if amount.is_sign_negative() {
                    (Decimal::ZERO, -amount)
                } else {
                    (amount, Decimal::ZERO)
                };
                row(account(&format!("{:04}", 1000 + i), "Generated", AccountType::Asset), debit, credit)
            })
            .collect();

        let filtered = builder().build(as_of(), false, rows.clone());
        let full = builder().build(as_of(), true, rows);

        let expected_kept = balances.iter().filter(|c| c.abs() > 1).count();
        prop_assert_eq!(filtered.accounts.len(), expected_kept);
        prop_assert!(filtered.accounts.iter().all(|a| a.balance.abs() > dec!(0.01)));
        prop_assert_eq!(full.accounts.len(), balances.len());
    }

    /// For a balanced ledger without income or expense activity,
    /// Assets - Liabilities == Equity.
    #[test]
    fn prop_accounting_equation_holds(
        postings in prop::collection::vec((0usize..3, 0usize..3, 1i64..10_000_000), 0..30),
    ) {
        let chart = chart();
        let summary = SummaryBuilder::new(Tolerance::CENT)
            .build(Some(as_of()), ledger_rows(&chart, &postings));

        prop_assert_eq!(summary.total_assets - summary.total_liabilities, summary.total_equity);
        prop_assert!(summary.is_balanced);
        prop_assert_eq!(summary.net_income, Decimal::ZERO);
    }

    /// With income and expenses, the gap is exactly the unclosed net income.
    #[test]
    fn prop_equation_gap_is_net_income(postings in prop::collection::vec(posting(), 0..30)) {
        let chart = chart();
        let summary = SummaryBuilder::new(Tolerance::CENT)
            .build(Some(as_of()), ledger_rows(&chart, &postings));

        prop_assert_eq!(
            summary.calculated_equity - summary.total_equity,
            summary.net_income
        );
        prop_assert_eq!(summary.net_income, summary.total_revenue - summary.total_expenses);
    }
}

//! Tests for ledger repository.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use tally_core::ledger::{AccountType, JournalEntry, JournalLine, LedgerError};
use tally_shared::AppError;
use tally_shared::types::{AccountId, JournalEntryId};

use super::{LedgerRepoError, LedgerRepository};
use crate::entities::{accounts, sea_orm_active_enums};

fn account_model(
    id: AccountId,
    code: &str,
    account_type: sea_orm_active_enums::AccountType,
) -> accounts::Model {
    let now = Utc::now().into();
    accounts::Model {
        id: id.into_inner(),
        code: code.to_string(),
        name: format!("Account {code}"),
        description: None,
        account_type,
        is_active: true,
        is_cash_equivalent: false,
        created_at: now,
        updated_at: now,
    }
}

fn totals_row(
    id: AccountId,
    debit: rust_decimal::Decimal,
    credit: rust_decimal::Decimal,
) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([
        ("account_id", Value::from(id.into_inner())),
        ("debit_total", Value::from(debit)),
        ("credit_total", Value::from(credit)),
    ])
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_account_balance_applies_sign_convention() {
    let cash = AccountId::new();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![account_model(
            cash,
            "1001",
            sea_orm_active_enums::AccountType::Asset,
        )]])
        .append_query_results([vec![totals_row(cash, dec!(10000), dec!(3000))]])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let (account, balance) = repo
        .account_balance(cash, Some(date(2025, 1, 31)))
        .await
        .unwrap();

    assert_eq!(account.account_type, AccountType::Asset);
    assert_eq!(balance.debit_total, dec!(10000));
    assert_eq!(balance.credit_total, dec!(3000));
    assert_eq!(balance.balance, dec!(7000));
}

#[tokio::test]
async fn test_account_balance_without_postings_is_zero() {
    let revenue = AccountId::new();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![account_model(
            revenue,
            "4001",
            sea_orm_active_enums::AccountType::Income,
        )]])
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let (_, balance) = repo.account_balance(revenue, None).await.unwrap();

    assert_eq!(balance.balance, dec!(0));
    assert_eq!(balance.debit_total, dec!(0));
}

#[tokio::test]
async fn test_account_balance_missing_account() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<accounts::Model>::new()])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let err = repo.account_balance(AccountId::new(), None).await.unwrap_err();

    assert!(matches!(err, LedgerRepoError::Ledger(LedgerError::AccountNotFound(_))));
    assert_eq!(AppError::from(err).status_code(), 404);
}

#[tokio::test]
async fn test_accounts_with_totals_fills_missing_with_zero() {
    let cash = AccountId::new();
    let capital = AccountId::new();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            account_model(cash, "1001", sea_orm_active_enums::AccountType::Asset),
            account_model(capital, "3001", sea_orm_active_enums::AccountType::Equity),
        ]])
        .append_query_results([vec![totals_row(cash, dec!(500), dec!(0))]])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let rows = repo.accounts_with_totals(None).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].balance().balance, dec!(500));
    assert_eq!(rows[1].account.id, capital);
    assert_eq!(rows[1].balance().balance, dec!(0));
}

#[tokio::test]
async fn test_unbalanced_entry_is_rejected_before_touching_the_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = LedgerRepository::new(db);

    let entry = JournalEntry {
        id: JournalEntryId::new(),
        date: date(2025, 1, 5),
        reference: None,
        description: None,
        lines: vec![
            JournalLine::debit(AccountId::new(), dec!(100)),
            JournalLine::credit(AccountId::new(), dec!(90)),
        ],
    };

    let err = repo.post_journal_entry(&entry, None).await.unwrap_err();
    assert!(matches!(err, LedgerRepoError::Ledger(LedgerError::Unbalanced { .. })));
}

#[tokio::test]
async fn test_entry_with_unknown_account_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let cash = AccountId::new();
    let entry = JournalEntry {
        id: JournalEntryId::new(),
        date: date(2025, 1, 5),
        reference: Some("JE-1".to_string()),
        description: None,
        lines: vec![
            JournalLine::debit(cash, dec!(100)),
            JournalLine::credit(cash, dec!(100)),
        ],
    };

    let err = repo.post_journal_entry(&entry, None).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerRepoError::Ledger(LedgerError::AccountNotFound(id)) if id == cash.into_inner()
    ));
}

#[tokio::test]
async fn test_negative_expense_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = LedgerRepository::new(db);

    let err = repo
        .record_expense(AccountId::new(), date(2025, 1, 5), dec!(-1), None)
        .await
        .unwrap_err();
    assert_eq!(AppError::from(err).status_code(), 400);
}

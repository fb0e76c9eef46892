//! Database seeder for Tally development and testing.
//!
//! Seeds a small chart of accounts, a month of journal entries, a few
//! expenses and one draft bank reconciliation.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use tally_core::ledger::{AccountType, BalanceCalculator, JournalEntry, JournalLine, PostedLine};
use tally_core::reconciliation::{Adjustments, ReconciliationEngine, StatementFigures};
use tally_db::entities::{accounts, bank_reconciliations, expenses, journal_entries};
use tally_db::repositories::{CreateAccountInput, ReconciliationInput};
use tally_db::{AccountRepository, LedgerRepository, ReconciliationRepository};
use tally_shared::types::{AccountId, JournalEntryId, Tolerance, UserId};
use uuid::Uuid;

/// Seed user recorded as creator of entries and reconciliations.
const SEED_USER_ID: Uuid = Uuid::from_u128(2);

/// Chart of accounts: code, name, type.
const CHART: [(&str, &str, AccountType); 8] = [
    ("1001", "Cash on Hand", AccountType::Asset),
    ("1010", "Bank - Operating", AccountType::Asset),
    ("1200", "Accounts Receivable", AccountType::Asset),
    ("2001", "Accounts Payable", AccountType::Liability),
    ("3001", "Owner Capital", AccountType::Equity),
    ("4001", "Sales Revenue", AccountType::Income),
    ("5001", "Rent Expense", AccountType::Expense),
    ("5002", "Office Supplies", AccountType::Expense),
];

/// Journal entries: reference, date, description, (debit code, credit code, amount).
const ENTRIES: [(&str, (i32, u32, u32), &str, (&str, &str, Decimal)); 5] = [
    ("SEED-0001", (2025, 1, 2), "Owner contribution", ("1010", "3001", dec!(50000))),
    ("SEED-0002", (2025, 1, 5), "Cash sales", ("1001", "4001", dec!(10000))),
    ("SEED-0003", (2025, 1, 10), "January rent", ("5001", "1001", dec!(3000))),
    ("SEED-0004", (2025, 1, 20), "Office supplies, check 1042", ("5002", "1010", dec!(450))),
    ("SEED-0005", (2025, 1, 28), "Invoice 2025-001", ("1200", "4001", dec!(1200))),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    println!("Connecting to database...");
    let db = tally_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    println!("Seeding chart of accounts...");
    seed_accounts(&db).await?;

    println!("Seeding journal entries...");
    let entries = seed_journal_entries(&db).await?;

    println!("Checking seeded balances...");
    check_balances(&db, &entries).await?;

    println!("Seeding expenses...");
    seed_expenses(&db).await?;

    println!("Seeding bank reconciliation...");
    seed_reconciliation(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

fn date((year, month, day): (i32, u32, u32)) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid seed date {year}-{month}-{day}"))
}

async fn account_id(db: &DatabaseConnection, code: &str) -> anyhow::Result<AccountId> {
    let account = accounts::Entity::find()
        .filter(accounts::Column::Code.eq(code))
        .one(db)
        .await?
        .with_context(|| format!("account {code} not seeded"))?;
    Ok(AccountId::from_uuid(account.id))
}

/// Creates every account in the chart that does not exist yet.
async fn seed_accounts(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = AccountRepository::new(db.clone());

    for (code, name, account_type) in CHART {
        let exists = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .count(db)
            .await?;
        if exists > 0 {
            println!("  Account {code} already exists, skipping...");
            continue;
        }

        repo.create_account(CreateAccountInput {
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            account_type,
            is_active: true,
            is_cash_equivalent: None,
        })
        .await?;
        println!("  Created account {code} {name}");
    }
    Ok(())
}

/// Posts the seed journal entries, skipping references already present.
///
/// Returns every seed entry, posted now or earlier.
async fn seed_journal_entries(db: &DatabaseConnection) -> anyhow::Result<Vec<JournalEntry>> {
    let repo = LedgerRepository::new(db.clone());
    let created_by = Some(UserId::from_uuid(SEED_USER_ID));
    let mut entries = Vec::with_capacity(ENTRIES.len());

    for (reference, entry_date, description, (debit_code, credit_code, amount)) in ENTRIES {
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            date: date(entry_date)?,
            reference: Some(reference.to_string()),
            description: Some(description.to_string()),
            lines: vec![
                JournalLine::debit(account_id(db, debit_code).await?, amount),
                JournalLine::credit(account_id(db, credit_code).await?, amount),
            ],
        };

        let exists = journal_entries::Entity::find()
            .filter(journal_entries::Column::Reference.eq(reference))
            .count(db)
            .await?;
        if exists > 0 {
            println!("  Entry {reference} already exists, skipping...");
        } else {
            repo.post_journal_entry(&entry, created_by).await?;
            println!("  Posted {reference}: {description} ({amount})");
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Compares ledger totals with the totals implied by the seed entries.
async fn check_balances(db: &DatabaseConnection, entries: &[JournalEntry]) -> anyhow::Result<()> {
    let lines: Vec<PostedLine> = entries.iter().flat_map(JournalEntry::posted_lines).collect();
    let expected = BalanceCalculator::aggregate(&lines, None);

    let ids: Vec<AccountId> = expected.keys().copied().collect();
    let stored = LedgerRepository::new(db.clone())
        .totals_for_accounts(&ids)
        .await?;

    for (code, name, account_type) in CHART {
        let id = account_id(db, code).await?;
        let Some(totals) = expected.get(&id).copied() else {
            continue;
        };
        let balance = BalanceCalculator::compute(account_type, totals).balance;
        if stored.get(&id).copied().unwrap_or_default() == totals {
            println!("  {code} {name}: {balance}");
        } else {
            println!("  {code} {name}: {balance} from seed data, ledger holds other postings too");
        }
    }
    Ok(())
}

/// Records expenses against the expense accounts once.
async fn seed_expenses(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = LedgerRepository::new(db.clone());
    let rent = account_id(db, "5001").await?;
    let supplies = account_id(db, "5002").await?;

    let existing = expenses::Entity::find()
        .filter(expenses::Column::AccountId.is_in([
            rent.into_inner(),
            supplies.into_inner(),
        ]))
        .count(db)
        .await?;
    if existing > 0 {
        println!("  Expenses already exist, skipping...");
        return Ok(());
    }

    repo.record_expense(rent, date((2025, 1, 10))?, dec!(3000), Some("January rent".to_string()))
        .await?;
    repo.record_expense(
        supplies,
        date((2025, 1, 20))?,
        dec!(450),
        Some("Printer paper and toner".to_string()),
    )
    .await?;
    println!("  Recorded 2 expenses");
    Ok(())
}

/// Creates a draft reconciliation of the operating bank account for January.
///
/// The book balance is computed from the ledger as of the statement date.
async fn seed_reconciliation(db: &DatabaseConnection) -> anyhow::Result<()> {
    let bank = account_id(db, "1010").await?;

    let existing = bank_reconciliations::Entity::find()
        .filter(bank_reconciliations::Column::BankAccountId.eq(bank.into_inner()))
        .count(db)
        .await?;
    if existing > 0 {
        println!("  Reconciliation already exists, skipping...");
        return Ok(());
    }

    let repo = ReconciliationRepository::new(db.clone(), ReconciliationEngine::new(Tolerance::CENT));
    let stored = repo
        .create(
            ReconciliationInput {
                bank_account_id: bank,
                statement_date: date((2025, 1, 31))?,
                statement_number: "STMT-2025-01".to_string(),
                statement: StatementFigures {
                    opening_balance: Decimal::ZERO,
                    closing_balance: dec!(49150),
                    adjustments: Adjustments {
                        outstanding_checks: dec!(450),
                        bank_charges: dec!(25),
                        interest_earned: dec!(75),
                        ..Adjustments::default()
                    },
                },
                book_balance: None,
                notes: Some("Check 1042 not yet cleared".to_string()),
            },
            UserId::from_uuid(SEED_USER_ID),
        )
        .await?;

    println!(
        "  Created draft reconciliation {} (difference {}, balanced: {})",
        stored.record.id, stored.result.difference, stored.result.is_balanced
    );
    Ok(())
}

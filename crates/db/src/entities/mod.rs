//! `SeaORM` entity definitions.

pub mod accounts;
pub mod bank_reconciliations;
pub mod expenses;
pub mod journal_entries;
pub mod journal_lines;
pub mod sea_orm_active_enums;

pub mod prelude {
    //! Entity re-exports.

    pub use super::accounts::Entity as Accounts;
    pub use super::bank_reconciliations::Entity as BankReconciliations;
    pub use super::expenses::Entity as Expenses;
    pub use super::journal_entries::Entity as JournalEntries;
    pub use super::journal_lines::Entity as JournalLines;
}

//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod ledger;
pub mod reconciliation;

pub use account::{
    AccountError, AccountFilter, AccountPage, AccountRepository, CreateAccountInput,
    RecentEntry, UpdateAccountInput,
};
pub use ledger::{LedgerRepoError, LedgerRepository};
pub use reconciliation::{
    ReconciliationFilter, ReconciliationInput, ReconciliationPage, ReconciliationRepoError,
    ReconciliationRepository, StoredReconciliation,
};

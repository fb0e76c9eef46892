//! Bank reconciliation.
//!
//! Compares a caller-supplied book balance with a bank statement after
//! adjustments, and drives the Draft ⇄ Reconciled lifecycle:
//! - Draft: editable, deletable, reconcilable once balanced
//! - Reconciled: locked until reset

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::ReconciliationEngine;
pub use error::ReconciliationError;
pub use types::{
    Adjustments, Reconciliation, ReconciliationDraft, ReconciliationResult, ReconciliationStatus,
    StatementFigures,
};

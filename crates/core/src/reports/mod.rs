//! Financial report generation.
//!
//! This module provides pure business logic for generating reports from
//! per-account totals:
//! - Trial Balance
//! - Balance Summary (accounting equation check)

pub mod summary;
pub mod trial_balance;
pub mod types;

#[cfg(test)]
mod tests;

pub use summary::SummaryBuilder;
pub use trial_balance::TrialBalanceBuilder;
pub use types::*;
